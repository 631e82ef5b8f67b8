// ─── Skins ───
// Account pictures for the account picker: the face of the player's skin with
// the hat layer on top. A skin that can't be fetched or decoded falls back to
// the default character skin.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::RemoteApi;

pub const AVATAR_SIZE: u32 = 30;

#[derive(Debug, Clone)]
pub struct SkinSource {
    /// Skins live at `<base>/<username>.png`.
    pub skin_url_base: String,
    pub default_skin_url: String,
}

impl SkinSource {
    pub fn skin_url(&self, username: &str) -> String {
        format!("{}/{}.png", self.skin_url_base.trim_end_matches('/'), username)
    }

    /// Avatar for `username`, using the default skin if theirs is unavailable
    /// and a blank square if that one is unavailable too.
    pub async fn avatar(&self, remote: &dyn RemoteApi, username: &str) -> RgbaImage {
        let url = self.skin_url(username);
        match fetch_avatar(remote, &url).await {
            Ok(avatar) => return avatar,
            Err(e) => warn!("Skin for {} unavailable ({}), using default", username, e),
        }

        fetch_avatar(remote, &self.default_skin_url)
            .await
            .unwrap_or_else(|e| {
                warn!("Default skin unavailable ({}), using a blank avatar", e);
                RgbaImage::new(AVATAR_SIZE, AVATAR_SIZE)
            })
    }
}

async fn fetch_avatar(remote: &dyn RemoteApi, url: &str) -> LauncherResult<RgbaImage> {
    let bytes = remote.fetch_bytes(url).await?;
    head_avatar(&bytes)
}

/// Compose the face (8x8 at 8,8) and hat overlay (8x8 at 40,8) of a skin,
/// scaled for HD skins, into an `AVATAR_SIZE` square.
pub fn head_avatar(skin_png: &[u8]) -> LauncherResult<RgbaImage> {
    let skin = image::load_from_memory(skin_png)?.to_rgba8();
    let scale = skin.width() / 64;
    if scale == 0 || skin.height() < 16 * scale {
        return Err(LauncherError::Other(format!(
            "Skin too small: {}x{}",
            skin.width(),
            skin.height()
        )));
    }
    debug!("Skin {}x{} (scale {})", skin.width(), skin.height(), scale);

    let tile = 8 * scale;
    let mut face = imageops::crop_imm(&skin, tile, tile, tile, tile).to_image();
    for pixel in face.pixels_mut() {
        *pixel = Rgba([pixel[0], pixel[1], pixel[2], 255]);
    }
    let hat = imageops::crop_imm(&skin, 5 * tile, tile, tile, tile).to_image();
    imageops::overlay(&mut face, &hat, 0, 0);

    Ok(imageops::resize(&face, AVATAR_SIZE, AVATAR_SIZE, FilterType::Nearest))
}
