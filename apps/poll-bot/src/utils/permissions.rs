use crate::error::Error;
use crate::Context;
use serenity::all::{Member, Permissions};

/// Check if a member may change server-wide poll settings.
pub fn can_manage_guild(member: &Member) -> bool {
    let perms = member.permissions.unwrap_or(Permissions::empty());
    perms.manage_guild() || perms.administrator()
}

/// Reject the invoking user unless they hold "Manage Server".
pub async fn ensure_manage_guild(ctx: Context<'_>) -> Result<(), Error> {
    let allowed = ctx
        .author_member()
        .await
        .is_some_and(|member| can_manage_guild(&member));

    if allowed {
        Ok(())
    } else {
        Err(Error::Forbidden(
            "You need \"Manage Server\" permission to configure poll settings!".into(),
        ))
    }
}
