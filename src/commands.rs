// User intents. Each subcommand maps onto one core operation, the way the
// window layer would drive it.

use std::convert::Infallible;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use image::ImageFormat;
use tracing::{info, warn};

use crate::core::auth::register_account;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::state::AppState;
use crate::core::version::Channel;

#[derive(Debug, Parser)]
#[command(name = "launchicube", version, about = "Multi-instance ClassiCube launcher")]
pub struct Cli {
    /// Where accounts, instances and the client cache live.
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(subcommand)]
    Instances(InstanceCommand),
    #[command(subcommand)]
    Accounts(AccountCommand),
    /// List client versions published on a channel.
    Versions {
        #[arg(long, default_value_t = Channel::Stable)]
        channel: Channel,
    },
    /// Download and run the updater, then restart.
    Update,
}

#[derive(Debug, Subcommand)]
pub enum InstanceCommand {
    List,
    Create {
        name: String,
        /// Defaults to the newest version on `--channel`.
        #[arg(long)]
        version: Option<String>,
        #[arg(long, default_value_t = Channel::Stable)]
        channel: Channel,
    },
    Delete {
        name: String,
    },
    Launch {
        name: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum AccountCommand {
    List,
    /// Verify the credentials against the login service and store them.
    Add {
        name: String,
        password: String,
    },
    Remove {
        name: String,
    },
    Select {
        name: String,
    },
    /// Save the account's head avatar as a PNG.
    Avatar {
        name: String,
        #[arg(long)]
        out: PathBuf,
    },
}

pub async fn execute(state: &AppState, command: Command) -> LauncherResult<()> {
    match command {
        Command::Instances(cmd) => instances(state, cmd).await,
        Command::Accounts(cmd) => accounts(state, cmd).await,
        Command::Versions { channel } => {
            for id in state.versions.list_versions(channel).await? {
                println!("{id}");
            }
            Ok(())
        }
        Command::Update => {
            let work_dir = std::env::current_dir().map_err(|e| LauncherError::io(".", e))?;
            let never: Infallible = state.updater(work_dir).update_and_restart().await?;
            match never {}
        }
    }
}

async fn instances(state: &AppState, cmd: InstanceCommand) -> LauncherResult<()> {
    match cmd {
        InstanceCommand::List => {
            for instance in state.instances.list().await? {
                let logo = if instance.logo_path_in(state.instances_dir()).is_some() {
                    " [logo]"
                } else {
                    ""
                };
                println!("{} ({}){}", instance.name, instance.version, logo);
            }
        }
        InstanceCommand::Create {
            name,
            version,
            channel,
        } => {
            let version = match version {
                Some(version) => version,
                None => newest_version(state, channel).await?,
            };
            let instance = state
                .instances
                .create(&state.versions, &name, &version)
                .await?;
            println!("Created '{}' with version {}", instance.name, instance.version);
        }
        InstanceCommand::Delete { name } => {
            let instance = state.instances.get(&name).await?;
            state.instances.delete(&instance).await?;
            println!("Deleted '{}'", instance.name);

            match state.instances.list().await?.first() {
                Some(next) => println!("Selected instance: {}", next.name),
                None => println!("No instances left"),
            }
        }
        InstanceCommand::Launch { name } => {
            let instance = state.instances.get(&name).await?;
            let account = state.accounts.get_selected().await?;
            if account.is_none() {
                warn!("No account selected, launching without credentials");
            }

            let outcome = state
                .launcher
                .launch(&state.versions, &instance, account.as_ref())
                .await?;
            match outcome.exit_code {
                Some(0) => println!("'{}' closed normally", instance.name),
                Some(code) => println!("'{}' exited with code {}", instance.name, code),
                None => println!("'{}' was terminated by a signal", instance.name),
            }
        }
    }
    Ok(())
}

async fn accounts(state: &AppState, cmd: AccountCommand) -> LauncherResult<()> {
    match cmd {
        AccountCommand::List => {
            let doc = state.accounts.load().await?;
            let selected = doc.selected_account().map(|a| a.name.clone());
            for account in &doc.accounts {
                let marker = if selected.as_deref() == Some(account.name.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {}", account.name);
            }
        }
        AccountCommand::Add { name, password } => {
            let account =
                register_account(&state.accounts, state.remote.as_ref(), &name, &password).await?;
            println!("Added and selected '{}'", account.name);
        }
        AccountCommand::Remove { name } => {
            let selected = state.accounts.remove_account(&name).await?;
            println!("Removed '{name}'");
            if let Some(selected) = selected {
                println!("Selected account: {selected}");
            }
        }
        AccountCommand::Select { name } => {
            let account = state.accounts.select(&name).await?;
            println!("Selected account: {}", account.name);
        }
        AccountCommand::Avatar { name, out } => {
            let avatar = state.skins.avatar(state.remote.as_ref(), &name).await;
            avatar.save_with_format(&out, ImageFormat::Png)?;
            info!("Saved avatar for {} to {:?}", name, out);
        }
    }
    Ok(())
}

async fn newest_version(state: &AppState, channel: Channel) -> LauncherResult<String> {
    state
        .versions
        .list_versions(channel)
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| LauncherError::VersionNotFound(format!("no {channel} versions published")))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::core::state::LauncherSettings;
    use crate::core::testing::{manifest_for_current_platform, FakeRemote};

    fn state(dir: &std::path::Path) -> AppState {
        let remote = FakeRemote::default()
            .with_manifest(manifest_for_current_platform(&["1.3.7", "1.3.6"]))
            .with_file("https://cdn.test/1.3.7", b"client-137")
            .with_file("https://cdn.test/1.3.6", b"client-136")
            .with_user("Steve", "pw1");
        AppState::with_remote(
            dir.to_path_buf(),
            LauncherSettings::default(),
            Arc::new(remote),
        )
    }

    #[test]
    fn parses_nested_subcommands() {
        let cli = Cli::try_parse_from([
            "launchicube",
            "--data-dir",
            "/tmp/lc",
            "instances",
            "create",
            "Survival",
            "--channel",
            "dev",
        ])
        .unwrap();

        assert_eq!(cli.data_dir, Some(PathBuf::from("/tmp/lc")));
        match cli.command {
            Command::Instances(InstanceCommand::Create {
                name,
                version,
                channel,
            }) => {
                assert_eq!(name, "Survival");
                assert_eq!(version, None);
                assert_eq!(channel, Channel::Dev);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_channel() {
        assert!(Cli::try_parse_from(["launchicube", "versions", "--channel", "nightly"]).is_err());
    }

    #[tokio::test]
    async fn create_defaults_to_newest_version() {
        let temp = tempfile::tempdir().unwrap();
        let state = state(temp.path());

        execute(
            &state,
            Command::Instances(InstanceCommand::Create {
                name: "Survival".into(),
                version: None,
                channel: Channel::Stable,
            }),
        )
        .await
        .unwrap();

        let instance = state.instances.get("Survival").await.unwrap();
        assert_eq!(instance.version, "1.3.7");
    }

    #[tokio::test]
    async fn add_then_remove_account() {
        let temp = tempfile::tempdir().unwrap();
        let state = state(temp.path());

        execute(
            &state,
            Command::Accounts(AccountCommand::Add {
                name: "steve".into(),
                password: "pw1".into(),
            }),
        )
        .await
        .unwrap();
        let selected = state.accounts.get_selected().await.unwrap().unwrap();
        assert_eq!(selected.name, "Steve");

        execute(
            &state,
            Command::Accounts(AccountCommand::Remove {
                name: "Steve".into(),
            }),
        )
        .await
        .unwrap();
        assert!(state.accounts.get_selected().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn deleting_unknown_instance_is_not_found() {
        let temp = tempfile::tempdir().unwrap();
        let state = state(temp.path());

        let err = execute(
            &state,
            Command::Instances(InstanceCommand::Delete {
                name: "Ghost".into(),
            }),
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
    }
}
