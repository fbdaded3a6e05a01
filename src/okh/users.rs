/// Prefix marking a wiki account in an `authors` list.
pub const USER_PREFIX: &str = "User:";

/// Turns a wiki user name into the name written as licensor.
pub trait UserResolver {
    fn resolve_user(&self, user_name: &str) -> String;
}

/// Returns the user name unchanged. User pages do not expose an e-mail
/// address, which is the only extra detail a licensor entry could use.
pub struct IdentityUsers;

impl UserResolver for IdentityUsers {
    fn resolve_user(&self, user_name: &str) -> String {
        user_name.to_string()
    }
}
