//! Musical key compatibility
//!
//! Harmonic mixability on a simplified 12-position mixing wheel (the
//! Camelot system DJs use): a key is mixable with itself, its relative
//! major/minor, and both modes of the two adjacent wheel positions - six
//! keys per anchor. The relation is computed from pitch-class arithmetic,
//! so it is total over all 24 major/minor keys rather than a hand-kept
//! table that covers only some of them.
//!
//! Labels that do not parse as a key (free-text tags, provider garbage)
//! degrade to exact-label matching.

/// Sharp-preferred pitch class names, index = semitones above C
const PITCH_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Major or minor mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Major,
    Minor,
}

/// A parsed musical key: pitch class (0-11, semitones above C) plus mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MusicalKey {
    pitch_class: u8,
    mode: Mode,
}

impl MusicalKey {
    /// Parse a key label: a pitch class name with an optional trailing `m`
    /// for minor. Sharp names are canonical; flat aliases (`Db`, `Eb`,
    /// `Gb`, `Ab`, `Bb`) are accepted and normalized.
    pub fn parse(label: &str) -> Option<Self> {
        let label = label.trim();
        let (root, mode) = match label.strip_suffix('m') {
            Some(root) if !root.is_empty() => (root, Mode::Minor),
            _ => (label, Mode::Major),
        };

        let pitch_class = match root {
            "C" => 0,
            "C#" | "Db" => 1,
            "D" => 2,
            "D#" | "Eb" => 3,
            "E" => 4,
            "F" => 5,
            "F#" | "Gb" => 6,
            "G" => 7,
            "G#" | "Ab" => 8,
            "A" => 9,
            "A#" | "Bb" => 10,
            "B" => 11,
            _ => return None,
        };

        Some(Self { pitch_class, mode })
    }

    /// Canonical (sharp-preferred) label for this key
    pub fn label(&self) -> String {
        let name = PITCH_NAMES[self.pitch_class as usize];
        match self.mode {
            Mode::Major => name.to_string(),
            Mode::Minor => format!("{}m", name),
        }
    }

    fn transpose(&self, semitones: u8) -> Self {
        Self {
            pitch_class: (self.pitch_class + semitones) % 12,
            mode: self.mode,
        }
    }

    /// Relative minor of a major key, relative major of a minor key
    pub fn relative(&self) -> Self {
        match self.mode {
            Mode::Major => Self {
                pitch_class: (self.pitch_class + 9) % 12,
                mode: Mode::Minor,
            },
            Mode::Minor => Self {
                pitch_class: (self.pitch_class + 3) % 12,
                mode: Mode::Major,
            },
        }
    }

    /// The six keys mixable with this one: both modes of this wheel
    /// position and of the positions a fifth up and a fifth down
    pub fn compatible_keys(&self) -> [MusicalKey; 6] {
        let up = self.transpose(7);
        let down = self.transpose(5);
        [
            *self,
            self.relative(),
            up,
            up.relative(),
            down,
            down.relative(),
        ]
    }

    pub fn is_compatible_with(&self, other: MusicalKey) -> bool {
        self.compatible_keys().contains(&other)
    }
}

/// Whether `target` is harmonically mixable out of `current`
///
/// When either label fails to parse the relation degrades to exact label
/// match only.
pub fn key_compatible(current: &str, target: &str) -> bool {
    match (MusicalKey::parse(current), MusicalKey::parse(target)) {
        (Some(c), Some(t)) => c.is_compatible_with(t),
        _ => {
            tracing::debug!(current, target, "unparsable key label, exact-match fallback");
            current == target
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// All 24 labels the system can emit
    fn all_keys() -> Vec<String> {
        let mut keys = Vec::new();
        for name in PITCH_NAMES {
            keys.push(name.to_string());
            keys.push(format!("{}m", name));
        }
        keys
    }

    #[test]
    fn every_key_is_compatible_with_itself() {
        for k in all_keys() {
            assert!(key_compatible(&k, &k), "{} not self-compatible", k);
        }
    }

    #[test]
    fn every_key_has_exactly_six_distinct_compatible_keys() {
        for k in all_keys() {
            let parsed = MusicalKey::parse(&k).unwrap();
            let set: std::collections::HashSet<_> =
                parsed.compatible_keys().into_iter().collect();
            assert_eq!(set.len(), 6, "{} has duplicate wheel entries", k);
        }
    }

    #[test]
    fn c_major_matches_the_classic_wheel_neighbourhood() {
        for target in ["C", "Am", "G", "F", "Em", "Dm"] {
            assert!(key_compatible("C", target), "C should accept {}", target);
        }
        for target in ["D", "B", "F#m", "C#"] {
            assert!(!key_compatible("C", target), "C should reject {}", target);
        }
    }

    #[test]
    fn a_minor_matches_the_classic_wheel_neighbourhood() {
        for target in ["Am", "C", "F", "G", "Dm", "Em"] {
            assert!(key_compatible("Am", target), "Am should accept {}", target);
        }
        assert!(!key_compatible("Am", "Bm"));
        assert!(!key_compatible("Am", "D"));
    }

    #[test]
    fn relative_relation_is_symmetric() {
        for k in all_keys() {
            let parsed = MusicalKey::parse(&k).unwrap();
            assert_eq!(parsed.relative().relative(), parsed);
            assert!(parsed.is_compatible_with(parsed.relative()));
            assert!(parsed.relative().is_compatible_with(parsed));
        }
    }

    #[test]
    fn flat_aliases_normalize_to_sharp_equivalents() {
        assert_eq!(
            MusicalKey::parse("Bb").unwrap(),
            MusicalKey::parse("A#").unwrap()
        );
        assert_eq!(
            MusicalKey::parse("Ebm").unwrap(),
            MusicalKey::parse("D#m").unwrap()
        );
        // Bb's neighbourhood, spelled with flats
        for target in ["Bb", "Gm", "F", "Eb", "Dm", "Cm"] {
            assert!(key_compatible("Bb", target), "Bb should accept {}", target);
        }
    }

    #[test]
    fn unparsable_labels_fall_back_to_exact_match() {
        assert!(key_compatible("H", "H"));
        assert!(!key_compatible("H", "C"));
        assert!(!key_compatible("C", "weird-tag"));
    }

    #[test]
    fn labels_round_trip_through_parse() {
        for k in all_keys() {
            assert_eq!(MusicalKey::parse(&k).unwrap().label(), k);
        }
    }
}
