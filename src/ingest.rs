//! Image ingestion through an injected classifier
//!
//! The host app supplies whatever turns a photo into garment attributes. This
//! module only runs it over a batch and hands the drafts to the catalog in one
//! atomic `add_many`, so a single bad image rejects the whole upload.

use crate::catalog::GarmentCatalog;
use crate::error::{ClassifyError, IngestError};
use crate::garment::{GarmentDraft, GarmentId, ImageRef};

/// Turns an image reference into proposed garment attributes
pub trait GarmentClassifier {
    fn classify(&self, image_ref: &ImageRef) -> Result<GarmentDraft, ClassifyError>;
}

impl<F> GarmentClassifier for F
where
    F: Fn(&ImageRef) -> Result<GarmentDraft, ClassifyError>,
{
    fn classify(&self, image_ref: &ImageRef) -> Result<GarmentDraft, ClassifyError> {
        self(image_ref)
    }
}

/// Classify every image and add the results to the catalog
///
/// The stored image reference is always the uploaded one, whatever the
/// classifier put in its draft. Returns ids in upload order.
pub fn upload<C>(
    catalog: &mut GarmentCatalog,
    classifier: &C,
    image_refs: &[String],
) -> Result<Vec<GarmentId>, IngestError>
where
    C: GarmentClassifier + ?Sized,
{
    let mut drafts = Vec::with_capacity(image_refs.len());
    for raw in image_refs {
        let image_ref = ImageRef::new(raw.as_str())?;
        let mut draft = classifier.classify(&image_ref)?;
        draft.image_ref = Some(image_ref.as_str().to_string());
        drafts.push(draft);
    }

    let ids = catalog.add_many(&drafts)?;
    tracing::info!(uploaded = ids.len(), "images ingested into catalog");
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::garment::Category;

    /// Reads attributes out of refs shaped like `"top/navy/4/25.0"`
    fn path_classifier(image_ref: &ImageRef) -> Result<GarmentDraft, ClassifyError> {
        let parts: Vec<&str> = image_ref.as_str().split('/').collect();
        let [category, color, formality, price] = parts.as_slice() else {
            return Err(ClassifyError {
                image_ref: image_ref.to_string(),
                reason: "unrecognized image".to_string(),
            });
        };

        let mut draft = GarmentDraft::new().color(*color).image_ref("ignored");
        draft.category = category.parse::<Category>().ok();
        draft.formality = formality.parse().ok();
        draft.price = price.parse().ok();
        Ok(draft)
    }

    fn refs(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_upload_adds_all_in_order() {
        let mut catalog = GarmentCatalog::new();
        let ids = upload(
            &mut catalog,
            &path_classifier,
            &refs(&["top/navy/4/25.0", "bottom/khaki/4/40.0", "shoes/brown/5/70.0"]),
        )
        .unwrap();

        assert_eq!(ids.len(), 3);
        assert_eq!(catalog.version(), 1);
        let footwear = catalog.get(ids[2]).unwrap();
        assert_eq!(footwear.category(), Category::Footwear);
        assert_eq!(footwear.image_ref().as_str(), "shoes/brown/5/70.0");
    }

    #[test]
    fn test_classifier_failure_aborts_upload() {
        let mut catalog = GarmentCatalog::new();
        let err = upload(
            &mut catalog,
            &path_classifier,
            &refs(&["top/navy/4/25.0", "blurry.jpg"]),
        )
        .unwrap_err();

        assert!(matches!(err, IngestError::Classify(ClassifyError { ref image_ref, .. }) if image_ref == "blurry.jpg"));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_invalid_classification_aborts_upload() {
        let mut catalog = GarmentCatalog::new();
        let err = upload(
            &mut catalog,
            &path_classifier,
            &refs(&["top/navy/4/25.0", "top/red/15/10.0"]),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            IngestError::Validation(ValidationError::InBatch { index: 1, .. })
        ));
        assert_eq!(catalog.version(), 0);
    }

    #[test]
    fn test_empty_image_ref_is_rejected() {
        let mut catalog = GarmentCatalog::new();
        let err = upload(&mut catalog, &path_classifier, &refs(&[""])).unwrap_err();
        assert_eq!(err, IngestError::Validation(ValidationError::EmptyImageRef));
    }
}
