// ─── LaunchiCube Core ───
// Everything below the UI: instances, accounts, versions, launching, updates.
//
// Architecture:
//   core/
//     error/      : LauncherError taxonomy
//     http/       : RemoteApi (network capability) + reqwest implementation
//     storage/    : whole-document JSON load/atomic save
//     options/    : targeted edits of the game's options.txt
//     auth/       : accounts, selection, login probe, skins
//     version/    : manifest, channels, artifact resolution + cache
//     downloader/ : SHA-256 validated downloads
//     instance/   : instance model + registry
//     launch/     : session patching + process orchestration
//     update/     : self-updater
//     state/      : settings + wiring

pub mod auth;
pub mod downloader;
pub mod error;
pub mod http;
pub mod instance;
pub mod launch;
pub mod options;
pub mod state;
pub mod storage;
pub mod update;
pub mod version;

#[cfg(test)]
pub(crate) mod testing;
