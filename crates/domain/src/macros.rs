//! Label conversions for the engine's status enums.
//!
//! Every status that is stored as TEXT or shown in a timeline goes through
//! [`impl_domain_status_conversions!`], so the database, logs and API share
//! one spelling per variant.

/// Generates `as_str`, `ALL`, `Display` and `FromStr` for a fieldless enum.
///
/// Parsing ignores ASCII case and surrounding whitespace. The error is a
/// `String` naming the enum, which storage layers wrap into their own error.
///
/// ```rust
/// use procura_domain::impl_domain_status_conversions;
///
/// #[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// pub enum Channel {
///     Portal,
///     Whatsapp,
/// }
///
/// impl_domain_status_conversions!(Channel {
///     Portal => "portal",
///     Whatsapp => "whatsapp",
/// });
///
/// assert_eq!(Channel::Whatsapp.as_str(), "whatsapp");
/// assert_eq!(" Portal ".parse::<Channel>(), Ok(Channel::Portal));
/// ```
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $enum_name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Stable snake_case label.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                let raw = raw.trim();
                Self::ALL
                    .iter()
                    .copied()
                    .find(|candidate| candidate.as_str().eq_ignore_ascii_case(raw))
                    .ok_or_else(|| format!("Invalid {}: {}", stringify!($enum_name), raw))
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum LineState {
        Open,
        CounterProposalPending,
    }

    impl_domain_status_conversions!(LineState {
        Open => "open",
        CounterProposalPending => "counter_proposal_pending",
    });

    #[test]
    fn display_uses_snake_case_label() {
        assert_eq!(LineState::Open.to_string(), "open");
        assert_eq!(LineState::CounterProposalPending.to_string(), "counter_proposal_pending");
    }

    #[test]
    fn parsing_is_case_insensitive() {
        assert_eq!(LineState::from_str("OPEN").unwrap(), LineState::Open);
        assert_eq!(
            LineState::from_str("Counter_Proposal_Pending").unwrap(),
            LineState::CounterProposalPending
        );
    }

    #[test]
    fn all_lists_variants_in_order() {
        assert_eq!(LineState::ALL, &[LineState::Open, LineState::CounterProposalPending]);
        assert_eq!(LineState::from_str("  open\n").unwrap(), LineState::Open);
    }

    #[test]
    fn unknown_label_names_the_enum() {
        let err = LineState::from_str("closed").unwrap_err();
        assert!(err.contains("Invalid LineState: closed"));
        assert!(LineState::from_str("").is_err());
    }
}
