//! Achievement icon records and the transfer tasks derived from them

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::TransferTask;

/// Which of an achievement's two icons
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IconKind {
    /// Unlocked (colour) icon
    Main,
    /// Locked (grayscale) icon
    Gray,
}

/// Icon file names attached to one achievement
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementIcons {
    /// Achievement API name; identifies the record in logs, never part of a URL
    pub api_name: String,
    /// File name of the unlocked icon on the CDN
    #[serde(default)]
    pub icon: Option<String>,
    /// File name of the locked icon on the CDN
    #[serde(default)]
    pub icon_gray: Option<String>,
}

impl AchievementIcons {
    /// File name for `kind`, if the achievement has a usable one
    pub fn file_name(&self, kind: IconKind) -> Option<&str> {
        let name = match kind {
            IconKind::Main => self.icon.as_deref(),
            IconKind::Gray => self.icon_gray.as_deref(),
        };
        name.map(str::trim).filter(|n| !n.is_empty())
    }
}

/// CDN location of an icon: `{cdn_base}/{app_id}/{file_name}`
pub fn icon_url(cdn_base: &str, app_id: &str, file_name: &str) -> String {
    format!("{}/{}/{}", cdn_base.trim_end_matches('/'), app_id, file_name)
}

/// Build the fetch list for a set of achievements
///
/// Each achievement contributes its main icon, then its gray icon, skipping
/// any that are absent. The task name is the icon's file name, so icons
/// shared between achievements collapse to one entry in the result mapping.
pub fn icon_tasks(
    cdn_base: &str,
    app_id: &str,
    achievements: &[AchievementIcons],
) -> Vec<TransferTask> {
    let mut tasks = Vec::with_capacity(achievements.len() * 2);
    for ach in achievements {
        let before = tasks.len();
        let names = [IconKind::Main, IconKind::Gray].map(|kind| ach.file_name(kind));
        for name in names.into_iter().flatten() {
            tasks.push(TransferTask::new(name, icon_url(cdn_base, app_id, name)));
        }
        if tasks.len() == before {
            debug!(api_name = %ach.api_name, "achievement contributes no icons");
        }
    }
    tasks
}
