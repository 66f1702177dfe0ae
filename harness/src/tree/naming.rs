//! Directory and file naming strategies

use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Length of the random part of every generated name
pub const SUFFIX_LEN: usize = 10;

/// Source of names for generated directories and files.
///
/// `index` is the position of the entry within its parent directory.
pub trait NameStrategy {
    fn dir_name(&mut self, index: u32) -> String;
    fn file_name(&mut self, index: u32) -> String;
}

/// Layout of generated names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NameStyle {
    /// `dir_<suffix>` and `file_<suffix>.txt`
    Plain,
    /// `<suffix>_<index>` and `file_<suffix>_<index>.txt`
    #[default]
    Indexed,
}

/// Random alphanumeric names, seeded for reproducible trees or drawn from OS entropy
pub struct RandomNames<R = StdRng> {
    rng: R,
    style: NameStyle,
}

impl RandomNames<StdRng> {
    /// Seeded when `seed` is given, otherwise from OS entropy
    pub fn new(style: NameStyle, seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(style, seed),
            None => Self::from_entropy(style),
        }
    }

    pub fn from_entropy(style: NameStyle) -> Self {
        Self::with_rng(StdRng::from_os_rng(), style)
    }

    pub fn seeded(style: NameStyle, seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), style)
    }
}

impl<R: Rng> RandomNames<R> {
    pub fn with_rng(rng: R, style: NameStyle) -> Self {
        Self { rng, style }
    }

    fn suffix(&mut self) -> String {
        (&mut self.rng)
            .sample_iter(Alphanumeric)
            .take(SUFFIX_LEN)
            .map(char::from)
            .collect()
    }
}

impl<R: Rng> NameStrategy for RandomNames<R> {
    fn dir_name(&mut self, index: u32) -> String {
        let suffix = self.suffix();
        match self.style {
            NameStyle::Plain => format!("dir_{suffix}"),
            NameStyle::Indexed => format!("{suffix}_{index}"),
        }
    }

    fn file_name(&mut self, index: u32) -> String {
        let suffix = self.suffix();
        match self.style {
            NameStyle::Plain => format!("file_{suffix}.txt"),
            NameStyle::Indexed => format!("file_{suffix}_{index}.txt"),
        }
    }
}
