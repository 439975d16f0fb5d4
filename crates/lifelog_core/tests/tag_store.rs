use lifelog_core::{
    make_archive, Archive, ArchiveError, EntityKind, NewTag, RawArchive, SequenceIdGenerator,
    Tag, TagPatch, TagValidationError, UuidIdGenerator,
};
use lifelog_core::Meta;

fn tag(id: &str, name: &str, aliases: &[&str], connections: &[&str]) -> Tag {
    Tag {
        id: id.to_string(),
        name: name.to_string(),
        aliases: aliases.iter().map(|value| value.to_string()).collect(),
        connections: connections.iter().map(|value| value.to_string()).collect(),
        meta: Meta::new(1_000),
    }
}

fn archive_with(tags: Vec<Tag>) -> Archive {
    make_archive(RawArchive {
        tags,
        narratives: Vec::new(),
    })
}

fn assert_names_unique(archive: &Archive) {
    let tags = archive.get_all_raw_tags();
    for (i, left) in tags.iter().enumerate() {
        for right in tags.iter().skip(i + 1) {
            for name in left.lowercase_names() {
                assert!(
                    !right.lowercase_names().any(|other| other == name),
                    "`{name}` shared by {} and {}",
                    left.id,
                    right.id
                );
            }
        }
    }
}

#[test]
fn create_on_empty_archive_assigns_fresh_id_and_defaults() {
    let archive = make_archive(RawArchive::default());
    let input = NewTag {
        name: "cats".to_string(),
        aliases: Some(vec!["kittens".to_string()]),
        connections: None,
    };

    let created = archive
        .create_new_tag(input, 5_000, &mut UuidIdGenerator)
        .unwrap();

    assert_eq!(created.result.id.len(), 36);
    assert_eq!(created.result.aliases, vec!["kittens".to_string()]);
    assert!(created.result.connections.is_empty());
    assert_eq!(created.result.meta, Meta::new(5_000));
    assert_eq!(created.archive.get_all_raw_tags(), &[created.result.clone()]);
}

#[test]
fn create_with_taken_name_fails_validation() {
    let archive = archive_with(vec![tag("123", "one", &[], &[])]);

    let err = archive
        .create_new_tag(NewTag::named("one"), 0, &mut UuidIdGenerator)
        .unwrap_err();

    assert!(matches!(
        err,
        ArchiveError::Validation(TagValidationError::NameTaken(_))
    ));
}

#[test]
fn create_rejects_alias_colliding_case_insensitively() {
    let archive = archive_with(vec![tag("1", "Running", &["jog"], &[])]);
    let input = NewTag {
        name: "sprint".to_string(),
        aliases: Some(vec!["JOG".to_string()]),
        connections: None,
    };

    let err = archive
        .create_new_tag(input, 0, &mut UuidIdGenerator)
        .unwrap_err();
    assert_eq!(
        err,
        ArchiveError::Validation(TagValidationError::NameTaken("jog".to_string()))
    );
}

#[test]
fn create_rejects_unknown_connection() {
    let archive = archive_with(vec![tag("1", "one", &[], &[])]);
    let input = NewTag {
        name: "two".to_string(),
        aliases: None,
        connections: Some(vec!["1".to_string(), "missing".to_string()]),
    };

    let err = archive
        .create_new_tag(input, 0, &mut UuidIdGenerator)
        .unwrap_err();
    assert_eq!(
        err,
        ArchiveError::Validation(TagValidationError::UnresolvedConnection(
            "missing".to_string()
        ))
    );
}

#[test]
fn delete_strips_dangling_connections() {
    let archive = archive_with(vec![
        tag("234", "this", &[], &[]),
        tag("123", "that", &[], &["234"]),
    ]);

    let deleted = archive.delete_tag("234").unwrap();

    assert!(deleted.result);
    assert_eq!(
        deleted.archive.get_all_raw_tags(),
        &[tag("123", "that", &[], &[])]
    );
    assert_eq!(archive.get_all_raw_tags().len(), 2);
}

#[test]
fn delete_and_update_unknown_ids_report_not_found() {
    let archive = archive_with(vec![tag("1", "one", &[], &[])]);

    let err = archive.delete_tag("nope").unwrap_err();
    assert_eq!(
        err,
        ArchiveError::NotFound {
            entity: EntityKind::Tag,
            id: "nope".to_string()
        }
    );

    let err = archive
        .update_tag("nope", TagPatch::default(), 0)
        .unwrap_err();
    assert!(matches!(err, ArchiveError::NotFound { .. }));
}

#[test]
fn update_merges_patch_and_keeps_position() {
    let archive = archive_with(vec![
        tag("1", "one", &["uno"], &[]),
        tag("2", "two", &[], &[]),
        tag("3", "three", &[], &[]),
    ]);
    let patch = TagPatch {
        name: None,
        aliases: Some(vec!["dos".to_string()]),
        connections: Some(vec!["1".to_string(), "3".to_string()]),
    };

    let updated = archive.update_tag("2", patch, 9_000).unwrap();

    let tags = updated.archive.get_all_raw_tags();
    assert_eq!(tags[1].id, "2");
    assert_eq!(tags[1].name, "two");
    assert_eq!(tags[1].aliases, vec!["dos".to_string()]);
    assert_eq!(tags[1].connections, vec!["1".to_string(), "3".to_string()]);
    assert_eq!(tags[1].meta.created, 1_000);
    assert_eq!(tags[1].meta.updated, 9_000);
    assert_names_unique(&updated.archive);
}

#[test]
fn update_keeps_own_names_but_not_names_of_others() {
    let archive = archive_with(vec![tag("1", "one", &["uno"], &[]), tag("2", "two", &[], &[])]);

    let renamed = archive
        .update_tag(
            "1",
            TagPatch {
                name: Some("ONE".to_string()),
                ..TagPatch::default()
            },
            0,
        )
        .unwrap();
    assert_eq!(renamed.result.name, "ONE");

    let err = renamed
        .archive
        .update_tag(
            "1",
            TagPatch {
                name: Some("Two".to_string()),
                ..TagPatch::default()
            },
            0,
        )
        .unwrap_err();
    assert!(matches!(err, ArchiveError::Validation(_)));
}

#[test]
fn lookups_are_case_insensitive_and_keep_input_order() {
    let archive = archive_with(vec![
        tag("abc", "Cats", &["kittens"], &[]),
        tag("def", "Work", &[], &[]),
    ]);

    assert_eq!(archive.get_raw_tag_by_id("ABC").map(|t| t.name.as_str()), Some("Cats"));
    assert_eq!(archive.get_raw_tag_by_name("KITTENS").map(|t| t.id.as_str()), Some("abc"));
    assert!(archive.get_raw_tag_by_name("dogs").is_none());

    let by_names = archive.get_raw_tags_by_names(&["work", "dogs", "cats"]);
    let ids: Vec<Option<&str>> = by_names.iter().map(|t| t.map(|t| t.id.as_str())).collect();
    assert_eq!(ids, vec![Some("def"), None, Some("abc")]);

    let by_ids = archive.get_raw_tags_by_ids(&["def"]);
    assert_eq!(by_ids.len(), 1);
}

#[test]
fn uniqueness_and_connections_hold_across_a_mutation_sequence() {
    let mut ids = SequenceIdGenerator::new("tag");
    let mut archive = make_archive(RawArchive::default());

    for (name, alias) in [("a", "alpha"), ("b", "beta"), ("c", "gamma")] {
        let input = NewTag {
            name: name.to_string(),
            aliases: Some(vec![alias.to_string()]),
            connections: Some(
                archive
                    .get_all_raw_tags()
                    .iter()
                    .map(|tag| tag.id.clone())
                    .collect(),
            ),
        };
        archive = archive.create_new_tag(input, 0, &mut ids).unwrap().archive;
    }
    assert!(archive
        .create_new_tag(NewTag::named("ALPHA"), 0, &mut ids)
        .is_err());

    archive = archive.delete_tag("tag-1").unwrap().archive;

    assert_names_unique(&archive);
    let known: Vec<&str> = archive
        .get_all_raw_tags()
        .iter()
        .map(|tag| tag.id.as_str())
        .collect();
    for tag in archive.get_all_raw_tags() {
        for connection in &tag.connections {
            assert!(known.contains(&connection.as_str()));
        }
    }
    assert_eq!(
        archive.get_raw_tag_by_id("tag-3").unwrap().connections,
        vec!["tag-2".to_string()]
    );
}
