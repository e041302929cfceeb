//! Reserved words of the definition language.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::circuit::DeviceKind;
use crate::names::{NameId, NameTable};

/// The three statement sections, in their required order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Section {
    Device,
    Connection,
    Monitor,
}

impl Section {
    pub const ALL: [Section; 3] = [Self::Device, Self::Connection, Self::Monitor];

    /// The heading word opening this section.
    pub fn heading(&self) -> &'static str {
        match self {
            Self::Device => "DEVICE",
            Self::Connection => "CONNECTION",
            Self::Monitor => "MONITOR",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// What a keyword introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    /// A device declaration of the given kind
    Device(DeviceKind),
    /// `CON`
    Connect,
    /// `MON`
    Monitor,
}

/// Reserved vocabularies, keyed by interned id.
///
/// Built once when a scanner is created and never modified afterwards.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    headings: HashMap<NameId, Section>,
    keywords: HashMap<NameId, Keyword>,
    pins: HashSet<NameId>,
}

impl Vocabulary {
    /// Intern every reserved word in `names`.
    pub fn new(names: &mut NameTable) -> Self {
        let headings = Section::ALL
            .into_iter()
            .map(|section| (names.lookup(section.heading()), section))
            .collect();

        let mut keywords: HashMap<NameId, Keyword> = DeviceKind::ALL
            .into_iter()
            .map(|kind| (names.lookup(kind.keyword()), Keyword::Device(kind)))
            .collect();
        keywords.insert(names.lookup("CON"), Keyword::Connect);
        keywords.insert(names.lookup("MON"), Keyword::Monitor);

        let mut pins: HashSet<NameId> = (1..=16)
            .map(|i| names.lookup(&format!("I{}", i)))
            .collect();
        pins.extend(names.lookup_all(&["Q", "QBAR", "DATA", "CLK", "SET", "CLEAR"]));

        Self {
            headings,
            keywords,
            pins,
        }
    }

    pub fn section(&self, id: NameId) -> Option<Section> {
        self.headings.get(&id).copied()
    }

    pub fn keyword(&self, id: NameId) -> Option<Keyword> {
        self.keywords.get(&id).copied()
    }

    pub fn is_pin(&self, id: NameId) -> bool {
        self.pins.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_classes_are_disjoint() {
        let mut names = NameTable::new();
        let vocab = Vocabulary::new(&mut names);

        let device = names.lookup("DEVICE");
        assert_eq!(vocab.section(device), Some(Section::Device));
        assert_eq!(vocab.keyword(device), None);

        let dtype = names.lookup("DTYPE");
        assert_eq!(vocab.keyword(dtype), Some(Keyword::Device(DeviceKind::DType)));
        assert!(!vocab.is_pin(dtype));

        assert!(vocab.is_pin(names.lookup("I16")));
        assert!(vocab.is_pin(names.lookup("QBAR")));
        assert!(!vocab.is_pin(names.lookup("I17")));
    }

    #[test]
    fn test_vocabulary_is_shared_with_pin_registry() {
        let mut names = NameTable::new();
        let pins = crate::circuit::PinIds::new(&mut names);
        let before = names.len();
        let vocab = Vocabulary::new(&mut names);

        assert!(vocab.is_pin(pins.q));
        assert!(vocab.is_pin(pins.numbered_inputs[15]));
        // headings and keywords are new, pins were already interned
        assert_eq!(names.len(), before + 3 + 12);
    }
}
