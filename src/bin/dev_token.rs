use careernet::application_impl::JwtIdentityService;
use careernet::domain_model::UserId;
use careernet::server::jwt_config;
use careernet::settings::{Parser, parse_settings};

/// Mint a bearer token for the jwt identity backend. Development aid only.
#[derive(Parser, Debug)]
struct Args {
    #[arg(long)]
    settings: Option<String>,
    /// User id (uuid) to put in `sub`.
    #[arg(long, conflicts_with = "username")]
    user: Option<UserId>,
    /// Derive the user id from a username, as the dev directory does.
    #[arg(long)]
    username: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = parse_settings(args.settings.as_deref())?;

    let user = match (args.user, args.username.as_deref()) {
        (Some(user), _) => user,
        (None, Some(username)) => UserId::from_username(username),
        (None, None) => return Err(anyhow::anyhow!("pass --user or --username")),
    };

    let identity = JwtIdentityService::new(jwt_config(&settings.identity)?);
    let (token, expires_at) = identity.issue(user)?;
    println!("{token}");
    eprintln!("user {user}, expires {expires_at}");
    Ok(())
}
