use anyhow::{Result, bail};
use colored::Colorize;
use scoutvision_auth::{AuthResponse, AuthService, SubjectClaims};

use crate::cli::{IssueArgs, LogoutArgs, RefreshArgs, ValidateArgs};
use crate::output::{print_json, print_success};

/// Claims for `issue`, falling back to the configured defaults field by field.
pub fn claims_for(service: &AuthService, args: &IssueArgs) -> SubjectClaims {
    let defaults = service.config().default_claims();
    SubjectClaims {
        roles: if args.roles.is_empty() {
            defaults.roles
        } else {
            args.roles.clone()
        },
        tenant_id: args.tenant.clone().unwrap_or(defaults.tenant_id),
        category: args.category.clone().unwrap_or(defaults.category),
    }
}

pub async fn issue(service: &AuthService, args: &IssueArgs) -> Result<()> {
    let claims = claims_for(service, args);
    match service.authenticate(&args.subject, &claims).await {
        Ok(pair) => print_json(&AuthResponse::success(pair)),
        Err(err) => {
            tracing::warn!(subject = %args.subject, reason = %err, "issue failed");
            print_json(&AuthResponse::failure(&err))?;
            bail!("issue failed: {}", err.public_code())
        }
    }
}

pub async fn validate(service: &AuthService, args: &ValidateArgs) -> Result<()> {
    if !args.verbose {
        if service.validate(&args.token).await {
            print_success("token is valid");
            return Ok(());
        }
        bail!("token rejected");
    }

    match service.check(&args.token).await {
        Ok(claims) => {
            print_success("token is valid");
            println!("{}: {}", "Subject".cyan(), claims.sub);
            println!("{}: {}", "Roles".cyan(), claims.roles.join(", "));
            println!("{}: {}", "Tenant".cyan(), claims.tenant_id);
            println!("{}: {}", "Category".cyan(), claims.category);
            println!("{}: {}", "Expires".cyan(), claims.expires_at());
            Ok(())
        }
        Err(err) => bail!("token rejected ({}): {err}", err.category()),
    }
}

pub async fn revoke(service: &AuthService, token: &str) -> Result<()> {
    service.revoke(token).await?;
    print_success("token revoked");
    Ok(())
}

pub async fn refresh(service: &AuthService, args: &RefreshArgs) -> Result<()> {
    let result = match (&args.access_token, &args.subject) {
        (Some(access_token), _) => {
            service
                .refresh_with_access_token(access_token, &args.refresh_token)
                .await
        }
        (None, Some(subject)) => service.refresh(&args.refresh_token, subject).await,
        (None, None) => bail!("either --subject or --access-token is required"),
    };

    match result {
        Ok(pair) => print_json(&AuthResponse::success(pair)),
        Err(err) => {
            tracing::warn!(reason = %err, "refresh failed");
            print_json(&AuthResponse::failure(&err))?;
            bail!("refresh failed: {}", err.public_code())
        }
    }
}

pub async fn logout(service: &AuthService, args: &LogoutArgs) -> Result<()> {
    service
        .logout(&args.access_token, &args.subject, &args.refresh_token)
        .await?;
    print_success(&format!("logged out {}", args.subject));
    Ok(())
}
