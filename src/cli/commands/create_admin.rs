use serde_json::json;

use crate::api::validation::validate_user_create;
use crate::api::ApiError;
use crate::config::Config;
use crate::services::UserService;
use crate::state::SharedState;

/// Bootstraps an administrator. `POST /api/admin` needs one to exist first.
pub async fn cmd_create_admin(
    config: Config,
    name: &str,
    email: &str,
    password: &str,
) -> anyhow::Result<()> {
    let mut input = match validate_user_create(&json!({
        "name": name,
        "email": email,
        "password": password,
    })) {
        Ok(input) => input,
        Err(ApiError::Validation { errors, .. }) => {
            for error in errors {
                println!("  - {error}");
            }
            anyhow::bail!("Invalid administrator details");
        }
        Err(e) => return Err(anyhow::anyhow!("{e}")),
    };
    input.is_admin = true;

    let state = SharedState::new(config).await?;
    let admin = state.users.create(input).await?;

    println!("✓ Created administrator {} <{}>", admin.name, admin.email);
    println!("  ID: {}", admin.id);

    Ok(())
}
