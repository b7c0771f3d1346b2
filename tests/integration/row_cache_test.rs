use sysdeck::core::system_monitor::{ConnectionRow, DiskRow, RowCache};

fn disk(name: &str, free: u64) -> DiskRow {
    DiskRow {
        name: name.to_string(),
        device: "/dev/sda1".to_string(),
        fs_type: "ext4".to_string(),
        total_bytes: 1_000,
        free_bytes: free,
        used_bytes: 1_000 - free,
        percent: (1_000 - free) as f32 / 10.0,
    }
}

fn conn(pid: u32, remote: &str) -> ConnectionRow {
    ConnectionRow {
        pid,
        name: format!("proc{}", pid),
        exe_path: String::new(),
        remote_addr: remote.to_string(),
        status: "ESTABLISHED".to_string(),
    }
}

#[test]
fn test_unplugged_volume_is_pruned() {
    let mut cache = RowCache::new();
    cache.apply(vec![disk("/", 400), disk("/media/usb", 900)]);

    let diff = cache.apply(vec![disk("/", 350)]);

    assert_eq!(diff.removed, vec!["/media/usb".to_string()]);
    assert_eq!(diff.updated, vec!["/".to_string()]);
    assert!(diff.added.is_empty());
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.get(&"/".to_string()).unwrap().free_bytes, 350);
}

#[test]
fn test_connections_keyed_by_remote_and_pid() {
    let mut cache = RowCache::new();
    let diff = cache.apply(vec![
        conn(10, "1.2.3.4:443"),
        conn(11, "1.2.3.4:443"),
        conn(10, "5.6.7.8:80"),
    ]);
    assert_eq!(diff.added.len(), 3);

    let diff = cache.apply(vec![conn(10, "1.2.3.4:443")]);
    assert_eq!(diff.removed.len(), 2);
    assert!(diff.added.is_empty());
    assert!(diff.updated.is_empty());
}

#[test]
fn test_empty_snapshot_clears_cache() {
    let mut cache = RowCache::new();
    cache.apply(vec![disk("/", 1)]);

    let diff = cache.apply(Vec::<DiskRow>::new());
    assert_eq!(diff.removed.len(), 1);
    assert!(cache.is_empty());
}
