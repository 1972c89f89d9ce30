use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single stored record (project, achievement or testimonial).
///
/// Records are kept as raw JSON objects so that whatever the admin screen
/// sends is persisted verbatim. The only server-owned key is `id`.
pub type Record = Map<String, Value>;

/// Top-level JSON documents kept in the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Projects,
    Achievements,
    Testimonials,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Projects,
        Collection::Achievements,
        Collection::Testimonials,
    ];

    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Projects => "projects.json",
            Collection::Achievements => "achievements.json",
            Collection::Testimonials => "testimonials.json",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Collection::Projects => "projects",
            Collection::Achievements => "achievements",
            Collection::Testimonials => "testimonials",
        }
    }

    // Singular, capitalized; used in response messages
    pub fn noun(self) -> &'static str {
        match self {
            Collection::Projects => "Project",
            Collection::Achievements => "Achievement",
            Collection::Testimonials => "Testimonial",
        }
    }

    // Key wrapping the record in PUT bodies: {"id": .., "achievement": {..}}
    pub fn payload_key(self) -> &'static str {
        match self {
            Collection::Projects => "project",
            Collection::Achievements => "achievement",
            Collection::Testimonials => "testimonial",
        }
    }

    /// Document written at startup when the file does not exist yet.
    pub fn empty_document(self) -> Value {
        match self {
            Collection::Projects => serde_json::json!({ "developer": [], "designer": [] }),
            Collection::Achievements | Collection::Testimonials => Value::Array(Vec::new()),
        }
    }
}

/// Named partition inside the projects document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Developer,
    Designer,
}

impl Bucket {
    pub fn parse(s: &str) -> Option<Bucket> {
        match s {
            "developer" => Some(Bucket::Developer),
            "designer" => Some(Bucket::Designer),
            _ => None,
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Bucket::Developer => "developer",
            Bucket::Designer => "designer",
        }
    }

    // developer ids read "d1", "d2", ...; designer ids are bare numbers
    pub fn id_prefix(self) -> &'static str {
        match self {
            Bucket::Developer => "d",
            Bucket::Designer => "",
        }
    }
}

/// Where a list of records lives: a flat collection, or one bucket of projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordSet {
    Flat(Collection),
    Projects(Bucket),
}

impl RecordSet {
    pub fn collection(self) -> Collection {
        match self {
            RecordSet::Flat(c) => c,
            RecordSet::Projects(_) => Collection::Projects,
        }
    }

    pub fn id_prefix(self) -> &'static str {
        match self {
            RecordSet::Flat(_) => "",
            RecordSet::Projects(b) => b.id_prefix(),
        }
    }

    /// Key of this set's high-water mark in `sequences.json`.
    pub fn sequence_key(self) -> String {
        match self {
            RecordSet::Flat(c) => c.name().to_string(),
            RecordSet::Projects(b) => format!("projects.{}", b.key()),
        }
    }
}

/// Highest numeric id ever handed out, per record set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sequences(pub std::collections::BTreeMap<String, u64>);

impl Sequences {
    pub fn high_water(&self, set: RecordSet) -> u64 {
        self.0.get(&set.sequence_key()).copied().unwrap_or(0)
    }

    pub fn bump(&mut self, set: RecordSet, value: u64) {
        let entry = self.0.entry(set.sequence_key()).or_insert(0);
        if value > *entry {
            *entry = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_parse_accepts_known_modes_only() {
        assert_eq!(Bucket::parse("developer"), Some(Bucket::Developer));
        assert_eq!(Bucket::parse("designer"), Some(Bucket::Designer));
        assert_eq!(Bucket::parse("Developer"), None);
        assert_eq!(Bucket::parse(""), None);
    }

    #[test]
    fn sequences_only_move_forward() {
        let mut seq = Sequences::default();
        let set = RecordSet::Projects(Bucket::Developer);
        seq.bump(set, 4);
        seq.bump(set, 2);
        assert_eq!(seq.high_water(set), 4);
        assert_eq!(seq.high_water(RecordSet::Flat(Collection::Achievements)), 0);
        assert_eq!(set.sequence_key(), "projects.developer");
    }
}
