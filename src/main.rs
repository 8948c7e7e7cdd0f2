use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::ArgAction;
use clap::Parser;
use k8s_oidc_helper::browser::launch_browser;
use k8s_oidc_helper::default_kube_path;
use k8s_oidc_helper::ClientCredentials;
use k8s_oidc_helper::Credentials;
use k8s_oidc_helper::HelperConfig;
use k8s_oidc_helper::IdentityProvider;
use k8s_oidc_helper::Kubeconfig;
use k8s_oidc_helper::OidcHelper;
use k8s_oidc_helper::UserClaim;
use k8s_oidc_helper::DEFAULT_ISSUER;
use k8s_oidc_helper::DEFAULT_REDIRECT_URI;
use k8s_oidc_helper::DEFAULT_SCOPES;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

/// Obtain an OIDC id token and write it into a kubeconfig for kubectl's oidc auth-provider
#[derive(Parser, Debug)]
#[command(name = "k8s-oidc-helper", disable_version_flag = true)]
struct Cli {
    /// Print version and exit
    #[arg(short = 'v', long)]
    version: bool,

    /// Open the oauth approval URL in the browser
    #[arg(
        short,
        long,
        env = "K8S_OIDC_HELPER_OPEN",
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        default_value_t = true
    )]
    open: bool,

    /// The ClientID for the application
    #[arg(long, env = "K8S_OIDC_HELPER_CLIENT_ID", default_value = "")]
    client_id: String,

    /// The ClientSecret for the application
    #[arg(long, env = "K8S_OIDC_HELPER_CLIENT_SECRET", default_value = "", hide_env_values = true)]
    client_secret: String,

    /// Path to a json file containing your application's ClientID and ClientSecret. Supersedes the --client-id and --client-secret flags
    #[arg(short, long, env = "K8S_OIDC_HELPER_CONFIG")]
    config: Option<PathBuf>,

    /// Write config to file. Merges in the specified file
    #[arg(short, long, env = "K8S_OIDC_HELPER_WRITE")]
    write: bool,

    /// The file to write to. If not specified, `~/.kube/config` is used
    #[arg(long, env = "K8S_OIDC_HELPER_FILE")]
    file: Option<PathBuf>,

    /// The OIDC issuer; its discovery document provides the endpoints
    #[arg(long, env = "K8S_OIDC_HELPER_ISSUER", default_value = DEFAULT_ISSUER)]
    issuer: String,

    /// The scopes to request from the identity provider
    #[arg(long, env = "K8S_OIDC_HELPER_SCOPE", default_value = DEFAULT_SCOPES)]
    scope: String,

    /// The redirect URI registered for the client
    #[arg(long, env = "K8S_OIDC_HELPER_REDIRECT_URI", default_value = DEFAULT_REDIRECT_URI)]
    redirect_uri: String,

    /// The claim used as the kubeconfig user name: email, sub or name
    #[arg(long, env = "K8S_OIDC_HELPER_USER_CLAIM", default_value = "email")]
    user_claim: UserClaim,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if cli.version {
        println!("{}", version_line());
        return ExitCode::SUCCESS;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

fn version_line() -> String {
    format!("k8s-oidc-helper v{}", env!("CARGO_PKG_VERSION"))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let credentials =
        ClientCredentials::resolve(cli.config.as_deref(), cli.client_id, cli.client_secret)
            .context("Error reading config file")?;

    let config = HelperConfig::new(credentials)
        .with_issuer(cli.issuer)
        .with_scopes(cli.scope)
        .with_redirect_uri(cli.redirect_uri)
        .with_user_claim(cli.user_claim);

    let provider = OidcHelper::new(config)
        .context("Error configuring the client")?
        .discover()
        .await
        .context("Error discovering the identity provider")?;

    let url = provider
        .authorization_url()
        .context("Error building request URL")?;
    launch_browser(cli.open, &url);

    let code = prompt_code().await.context("Error reading the code")?;

    let credentials = fetch_credentials(&provider, &code, cli.user_claim).await?;

    if !cli.write {
        let snippet = credentials.to_snippet().context("Unexpected error")?;
        println!();
        print!("{snippet}");
        return Ok(());
    }

    let path = match cli.file {
        Some(path) => path,
        None => default_kube_path().context("Could not determine the kubeconfig path")?,
    };

    let mut kubeconfig = Kubeconfig::read_from(&path).context("Could not merge configuration")?;
    kubeconfig.upsert_auth_info(&credentials.user, credentials.auth_info);
    kubeconfig
        .write_to(&path)
        .context("Could not write configuration")?;

    println!("Configuration has been written to {}", path.display());
    Ok(())
}

/// Exchange the code and resolve the user, naming the step that failed
async fn fetch_credentials<P>(
    provider: &P,
    code: &str,
    claim: UserClaim,
) -> anyhow::Result<Credentials>
where
    P: IdentityProvider + Sync,
{
    let tokens = provider
        .exchange_code(code)
        .await
        .context("Error getting tokens")?;
    let user = provider
        .user_claim(&tokens)
        .await
        .with_context(|| format!("Error getting user {claim}"))?;
    let auth_info = provider.auth_info(&tokens);

    Ok(Credentials { user, auth_info })
}

async fn prompt_code() -> anyhow::Result<String> {
    print!("Enter the code your identity provider gave you: ");
    std::io::stdout().flush()?;

    let mut code = String::new();
    BufReader::new(tokio::io::stdin()).read_line(&mut code).await?;
    Ok(code.trim().to_string())
}
