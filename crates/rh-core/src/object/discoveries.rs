//! Object identification knowledge (o_init.c)

use hashbrown::HashMap;

use super::OBJECTS;

/// Which object types the player has identified or named
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discoveries {
    known: Vec<bool>,
    called: HashMap<u16, String>,
}

impl Default for Discoveries {
    fn default() -> Self {
        Self {
            known: vec![false; OBJECTS.len()],
            called: HashMap::new(),
        }
    }
}

impl Discoveries {
    pub fn is_known(&self, otyp: u16) -> bool {
        self.known.get(otyp as usize).copied().unwrap_or(false)
    }

    pub fn learn(&mut self, otyp: u16) {
        if let Some(slot) = self.known.get_mut(otyp as usize) {
            *slot = true;
        }
    }

    pub fn call(&mut self, otyp: u16, name: impl Into<String>) {
        if (otyp as usize) < OBJECTS.len() {
            self.called.insert(otyp, name.into());
        }
    }

    pub fn called(&self, otyp: u16) -> Option<&str> {
        self.called.get(&otyp).map(String::as_str)
    }

    /// Known object types in table order
    pub fn known_types(&self) -> impl Iterator<Item = u16> + '_ {
        self.known
            .iter()
            .enumerate()
            .filter(|(_, k)| **k)
            .map(|(i, _)| i as u16)
    }

    /// Called names sorted by object type
    pub fn called_names(&self) -> Vec<(u16, &str)> {
        let mut names: Vec<(u16, &str)> =
            self.called.iter().map(|(k, v)| (*k, v.as_str())).collect();
        names.sort_by_key(|(k, _)| *k);
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_learn_and_call() {
        let mut disc = Discoveries::default();
        disc.learn(3);
        disc.learn(u16::MAX);
        disc.call(5, "murky");
        disc.call(u16::MAX, "ignored");
        assert!(disc.is_known(3));
        assert_eq!(disc.known_types().collect::<Vec<_>>(), vec![3]);
        assert_eq!(disc.called(5), Some("murky"));
        assert_eq!(disc.called_names().len(), 1);
    }
}
