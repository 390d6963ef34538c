/// OS detection block of a host.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Os {
    pub matches: Vec<OsMatch>,
    pub ports_used: Vec<PortUsed>,
}

impl Os {
    /// The match with the highest accuracy; the earliest one wins a tie.
    pub fn best_match(&self) -> Option<&OsMatch> {
        self.matches
            .iter()
            .rev()
            .max_by_key(|os_match| os_match.accuracy)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsMatch {
    pub name: String,
    pub accuracy: u8,
    /// Line of the fingerprint in `nmap-os-db`.
    pub line: u64,
    pub class: Option<OsClass>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OsClass {
    pub kind: String,
    pub osfamily: String,
    pub vendor: String,
    pub osgen: String,
    pub accuracy: u8,
}

/// A port nmap relied on while fingerprinting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortUsed {
    pub state: String,
    pub proto: String,
    pub portid: u16,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn os_match(name: &str, accuracy: u8) -> OsMatch {
        OsMatch {
            name: name.to_string(),
            accuracy,
            ..Default::default()
        }
    }

    #[test]
    fn test_best_match_prefers_accuracy_then_order() {
        let os = Os {
            matches: vec![
                os_match("Linux 4.15", 96),
                os_match("Linux 5.4", 98),
                os_match("Linux 5.10", 98),
            ],
            ports_used: Vec::new(),
        };

        assert_eq!(os.best_match().map(|m| m.name.as_str()), Some("Linux 5.4"));
        assert!(Os::default().best_match().is_none());
    }
}
