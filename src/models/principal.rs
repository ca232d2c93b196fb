//! The verified identity attached to a private request.

/// Caller identity, built only from what the identity provider returned.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    /// Stable user identifier issued by the provider.
    pub subject_id: String,
    pub email: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
}
