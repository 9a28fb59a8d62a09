use std::fmt::{Display, Formatter};

/// The closed set of participants. `Holder0` and `Holder1` each keep one
/// additive share of every secret; `Helper` holds no shares and only serves
/// correlated randomness and restricted reveals.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Role {
    Holder0,
    Holder1,
    Helper,
}

impl Role {
    const H0_STR: &'static str = "H0";
    const H1_STR: &'static str = "H1";
    const HELPER_STR: &'static str = "HLP";

    #[must_use]
    pub fn all() -> &'static [Role; 3] {
        const ALL: [Role; 3] = [Role::Holder0, Role::Holder1, Role::Helper];
        &ALL
    }

    /// The two share-holding roles, in canonical order.
    #[must_use]
    pub fn holders() -> [Role; 2] {
        [Role::Holder0, Role::Holder1]
    }

    #[must_use]
    pub fn as_static_str(&self) -> &'static str {
        match self {
            Role::Holder0 => Role::H0_STR,
            Role::Holder1 => Role::H1_STR,
            Role::Helper => Role::HELPER_STR,
        }
    }

    #[must_use]
    pub fn is_holder(&self) -> bool {
        !matches!(self, Role::Helper)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_static_str())
    }
}

#[cfg(test)]
mod tests {
    use super::Role;

    #[test]
    fn counts() {
        assert_eq!(3, Role::all().len());
        assert_eq!(2, Role::holders().len());
        assert!(Role::holders().iter().all(Role::is_holder));
        assert!(!Role::Helper.is_holder());
    }

    #[test]
    fn display() {
        assert_eq!("H0", Role::Holder0.to_string());
        assert_eq!("H1", Role::Holder1.to_string());
        assert_eq!("HLP", Role::Helper.to_string());
    }
}
