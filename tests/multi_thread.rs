//! The shared registry and namespace table used from many threads

use std::sync::Arc;
use std::thread;

use photo_xmp::core::namespace_prefix;
use photo_xmp::{ns, register_namespace, PhotoXmp, PropertyShape, Tag, TagRegistry, TagValue, XmpMeta};

#[test]
fn shared_registry_is_one_instance() {
    let handles: Vec<_> = (0..8)
        .map(|_| thread::spawn(|| TagRegistry::shared() as *const TagRegistry as usize))
        .collect();

    let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn concurrent_tag_writes_on_separate_trees() {
    let mut handles = vec![];

    // Each thread owns its tree; only the registry is shared
    for i in 0..10 {
        let handle = thread::spawn(move || {
            let mut photo = PhotoXmp::new(TagRegistry::shared());
            photo.set_entry(Tag::GPSImgDirection, (i * 45) as f64).unwrap();
            photo.set_entry(Tag::Rating, i as i64).unwrap();
            assert_eq!(
                photo.entry(Tag::GPSImgDirection),
                Some(TagValue::Real(((i * 45) % 360) as f64))
            );
            assert_eq!(photo.entry(Tag::Rating), Some(TagValue::from(i.to_string())));
        });
        handles.push(handle);
    }

    // Wait for all threads to complete
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn concurrent_reads_of_one_tree() {
    let mut meta = XmpMeta::new();
    meta.set_property(ns::EXIF, "GPSLatitude", "48,51,29.5N", PropertyShape::Simple)
        .unwrap();
    let meta = Arc::new(meta);

    let handles: Vec<_> = (0..5)
        .map(|_| {
            let meta = Arc::clone(&meta);
            thread::spawn(move || {
                let photo = PhotoXmp::from_meta((*meta).clone(), TagRegistry::shared());
                assert_eq!(photo.entry(Tag::GPSLatitudeRef), Some(TagValue::from("N")));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn concurrent_namespace_registration() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            thread::spawn(move || {
                let uri = format!("http://example.com/ns/thread{}/", i);
                let prefix = format!("thread{}", i);
                register_namespace(&uri, &prefix).unwrap();
                assert_eq!(namespace_prefix(&uri).as_deref(), Some(prefix.as_str()));

                let mut meta = XmpMeta::new();
                meta.set_property(&uri, "Value", "x", PropertyShape::Simple)
                    .unwrap();
                let path = format!("{}:Value", prefix);
                assert!(meta.has_property(&uri, &path));
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
