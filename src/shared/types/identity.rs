/// Identity of the caller, inserted into request extensions by whichever
/// authentication layer fronts the router. Handlers and middleware treat
/// it as optional.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub role: String,
}

impl AuthenticatedUser {
    pub fn new(user_id: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            role: role.into(),
        }
    }
}
