#![deny(clippy::all, clippy::pedantic)]

use inkpost::application::AppContext;
use serde_json::json;

use crate::args::LoginArgs;
use crate::context::CliError;
use crate::io::read_password;
use crate::print::print_json;

pub async fn login(ctx: &AppContext, args: LoginArgs) -> Result<(), CliError> {
    let password = read_password(args.password_file, args.password_env)?;
    let user = ctx
        .auth_service()
        .login(&args.email, &password)
        .await
        .map_err(CliError::action("Login failed"))?;
    print_json(&user)
}

pub fn logout(ctx: &AppContext) -> Result<(), CliError> {
    ctx.auth_service()
        .logout()
        .map_err(CliError::action("Logout failed"))?;
    print_json(&json!({ "authenticated": false }))
}

pub fn whoami(ctx: &AppContext) -> Result<(), CliError> {
    print_json(&json!({
        "authenticated": ctx.auth().is_authenticated(),
        "user": ctx.auth_service().current_user(),
    }))
}
