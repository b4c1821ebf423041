// ABOUTME: Tag operations behind the CLI subcommands
// ABOUTME: Reads and replaces record tags, intersects tags, reports related tags and usage

use anyhow::{anyhow, bail};
use tracing::debug;

use tagging_tags::{CountedTag, ObjectSource, Tag, TagField, TagStorage, TaggedObject};

/// Tags on one record. With `set`, the record's tags are replaced first.
pub async fn object_tags(
    storage: &TagStorage,
    content_type: &str,
    object_id: &str,
    set: Option<&str>,
) -> anyhow::Result<Vec<Tag>> {
    match set {
        Some(input) => {
            let cleaned = TagField::new("tags", storage.settings())
                .optional()
                .clean(Some(input))?;
            debug!("Setting tags on {}:{} to '{}'", content_type, object_id, cleaned);
            Ok(storage.update_tags(content_type, object_id, &cleaned).await?)
        }
        None => Ok(storage.get_for_object(content_type, object_id).await?),
    }
}

/// Records of `content_type` carrying every tag named in `input`
pub async fn tagged_objects(
    storage: &TagStorage,
    content_type: &str,
    input: &str,
) -> anyhow::Result<Vec<TaggedObject>> {
    let wanted = storage.normalized_names(input);
    if wanted.is_empty() {
        bail!("No tags were given: \"{}\".", input);
    }

    let tags = storage.get_tag_list(input).await?;
    if tags.len() < wanted.len() {
        // An unknown tag can never be carried, so the intersection is empty
        return Ok(Vec::new());
    }

    let source = ObjectSource::Model(content_type.to_string());
    let (objects, _) = storage.get_by_model(&source, &tags, None, None).await?;
    Ok(objects)
}

/// Tags that co-occur with `tag` on records of `content_type`
pub async fn related_tags(
    storage: &TagStorage,
    content_type: &str,
    tag: &str,
    counts: bool,
) -> anyhow::Result<Vec<CountedTag>> {
    let tag = storage
        .get_tag(tag)
        .await?
        .ok_or_else(|| anyhow!("No Tag found matching \"{}\".", tag))?;

    Ok(storage
        .related_for_model(std::slice::from_ref(&tag), content_type, counts, None)
        .await?)
}

/// Every tag used on `content_type`, with counts
pub async fn model_usage(
    storage: &TagStorage,
    content_type: &str,
) -> anyhow::Result<Vec<CountedTag>> {
    Ok(storage.usage_for_model(content_type, true, None).await?)
}
