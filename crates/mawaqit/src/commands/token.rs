//! `mawaqit token`: log in once and print (or store) the API token.

use secrecy::SecretString;
use serde::Serialize;

use mawaqit_config::SecretKind;

use crate::cli::TokenArgs;
use crate::commands::Ctx;
use crate::error::CliError;
use crate::output;

#[derive(Serialize)]
struct IssuedToken<'a> {
    username: &'a str,
    token: &'a str,
    saved: bool,
}

pub async fn handle(args: TokenArgs, ctx: &Ctx<'_>) -> Result<(), CliError> {
    let username = args
        .username
        .or_else(|| ctx.cfg.username().map(str::to_owned))
        .ok_or_else(|| CliError::Validation {
            field: "username".into(),
            reason: "pass --username or set `username` in the config file".into(),
        })?;

    let password = match ctx.cfg.resolve_password() {
        Some(password) => password,
        None => SecretString::from(rpassword::prompt_password(format!(
            "Mawaqit password for {username}: "
        ))?),
    };

    let client = ctx.cfg.build_client(None)?;
    let token = client.issue_token(&username, &password).await?;
    tracing::info!(%username, "API token issued");

    if args.save {
        mawaqit_config::store_secret(SecretKind::Token, token.expose())?;
        if !ctx.global.quiet {
            eprintln!("Token stored in the system keyring");
        }
    }

    let issued = IssuedToken {
        username: &username,
        token: token.expose(),
        saved: args.save,
    };
    let rendered = output::render_single(
        ctx.format,
        &issued,
        |t| {
            if t.saved {
                String::new()
            } else {
                t.token.to_owned()
            }
        },
        |t| t.token.to_owned(),
    )?;
    ctx.print(&rendered);
    Ok(())
}
