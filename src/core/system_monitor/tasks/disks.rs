//! Disk usage collector.

use sysinfo::Disks;

use super::stats::percent_of;
use crate::core::sampler::Collector;
use crate::core::system_monitor::DiskRow;
use crate::error::Result;

const OPTICAL_FILESYSTEMS: [&str; 3] = ["iso9660", "udf", "cdfs"];

/// Collector for mounted volumes.
///
/// Polling frequency: 5 seconds (disk usage changes slowly)
pub struct DiskCollector {
    disks: Disks,
}

impl DiskCollector {
    pub fn new() -> Self {
        Self {
            disks: Disks::new_with_refreshed_list(),
        }
    }
}

impl Default for DiskCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector for DiskCollector {
    type Snapshot = Vec<DiskRow>;

    fn name(&self) -> &str {
        "disks"
    }

    fn collect(&mut self) -> Result<Vec<DiskRow>> {
        self.disks.refresh(true);

        Ok(self
            .disks
            .iter()
            .filter_map(|disk| {
                disk_row(
                    &disk.name().to_string_lossy(),
                    &disk.mount_point().to_string_lossy(),
                    &disk.file_system().to_string_lossy(),
                    disk.total_space(),
                    disk.available_space(),
                )
            })
            .collect())
    }
}

/// Build one row, or `None` for volumes that should not be listed.
///
/// Optical drives, entries without a file system and volumes reporting zero
/// capacity (unreadable or unmounted media) are skipped.
pub(crate) fn disk_row(
    device: &str,
    mount: &str,
    fs_type: &str,
    total: u64,
    available: u64,
) -> Option<DiskRow> {
    let fs_lower = fs_type.to_ascii_lowercase();
    if fs_lower.is_empty() || OPTICAL_FILESYSTEMS.contains(&fs_lower.as_str()) || total == 0 {
        return None;
    }

    let used = total.saturating_sub(available);
    Some(DiskRow {
        name: trim_mount(mount).to_string(),
        device: device.to_string(),
        fs_type: fs_type.to_string(),
        total_bytes: total,
        free_bytes: available,
        used_bytes: used,
        percent: percent_of(used, total),
    })
}

/// `C:\` becomes `C:`, `/mnt/data/` becomes `/mnt/data`; a bare root stays as is.
fn trim_mount(mount: &str) -> &str {
    let trimmed = mount.trim_end_matches(['\\', '/']);
    if trimmed.is_empty() {
        mount
    } else {
        trimmed
    }
}
