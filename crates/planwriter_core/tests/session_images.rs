use planwriter_core::notice::{IMAGE_TYPE_REJECTED, IMAGE_UPLOAD_FAILED};
use planwriter_core::store::plan_repo::RepoResult;
use planwriter_core::{
    ClipboardItem, DocumentStore, EditorEvent, EditorSet, ImageAttributes, ImageBlob,
    ImageUploadService, MemoryEditor, PlanId, PlanRepository, RecordingNotifier, SectionContent,
    SectionKey, SectionKind, SessionConfig, SlotName, UploadError, WriteSession,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

struct MemoryRepo;

impl PlanRepository for MemoryRepo {
    fn save_sections(
        &mut self,
        _plan_id: PlanId,
        _sections: &BTreeMap<SectionKey, SectionContent>,
    ) -> RepoResult<()> {
        Ok(())
    }

    fn load_sections(&self, _plan_id: PlanId) -> RepoResult<BTreeMap<SectionKey, SectionContent>> {
        Ok(BTreeMap::new())
    }
}

struct StubUploader {
    dimensions: (u32, u32),
    fail_upload: bool,
    uploads: Cell<usize>,
}

impl StubUploader {
    fn new(width: u32, height: u32) -> Self {
        Self {
            dimensions: (width, height),
            fail_upload: false,
            uploads: Cell::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            fail_upload: true,
            ..Self::new(0, 0)
        }
    }
}

impl ImageUploadService for StubUploader {
    fn upload(&self, image: &ImageBlob) -> Result<String, UploadError> {
        self.uploads.set(self.uploads.get() + 1);
        if self.fail_upload {
            return Err(UploadError::Upload("bucket unavailable".to_string()));
        }
        Ok(format!("https://cdn.example.test/{}", image.file_name))
    }

    fn probe_dimensions(&self, _url: &str) -> Result<(u32, u32), UploadError> {
        Ok(self.dimensions)
    }
}

fn png(name: &str) -> ImageBlob {
    ImageBlob {
        file_name: name.to_string(),
        mime_type: "image/png".to_string(),
        bytes: vec![0x89, 0x50, 0x4e, 0x47],
    }
}

struct Overview {
    session: WriteSession,
    notifier: Rc<RecordingNotifier>,
    name: Rc<MemoryEditor>,
    features: Rc<MemoryEditor>,
    goals: Rc<MemoryEditor>,
}

fn overview() -> Overview {
    let store = Rc::new(RefCell::new(DocumentStore::new(Box::new(MemoryRepo))));
    let notifier = Rc::new(RecordingNotifier::new());
    let mut session = WriteSession::new(store, notifier.clone(), SessionConfig::default())
        .expect("default config is valid");

    let name = MemoryEditor::shared(SlotName::ItemName);
    let features = MemoryEditor::shared(SlotName::Features);
    let goals = MemoryEditor::shared(SlotName::Goals);
    let editors = EditorSet::new(SectionKind::Overview)
        .with(SlotName::ItemName, name.clone())
        .and_then(|set| set.with(SlotName::Features, features.clone()))
        .and_then(|set| set.with(SlotName::Goals, goals.clone()))
        .expect("bindings");
    session
        .open_section(SectionKey::overview(), "Overview", editors)
        .expect("open overview");

    Overview {
        session,
        notifier,
        name,
        features,
        goals,
    }
}

#[test]
fn picker_without_focus_targets_the_primary_editor() {
    let mut fixture = overview();
    assert!(fixture.session.active_slot().is_none());

    assert!(fixture.session.begin_image_insert());
    assert_eq!(fixture.features.focus_count(), 1);
    assert_eq!(fixture.session.active_slot(), Some(SlotName::Features));

    let uploader = StubUploader::new(1344, 800);
    let inserted = fixture
        .session
        .insert_image(&png("chart.png"), &uploader)
        .expect("image inserted");

    assert_eq!(
        inserted,
        ImageAttributes {
            src: "https://cdn.example.test/chart.png".to_string(),
            width: Some(672),
            height: Some(400),
        }
    );
    assert_eq!(fixture.features.inserted_images(), vec![inserted]);
    assert!(fixture.notifier.messages().is_empty());
}

#[test]
fn image_goes_to_the_last_focused_editor() {
    let mut fixture = overview();
    fixture.session.dispatch(SlotName::Goals, EditorEvent::Focus);
    fixture.goals.set_selection_width(Some(300));

    assert!(fixture.session.begin_image_insert());
    assert_eq!(fixture.features.focus_count(), 0);

    let inserted = fixture
        .session
        .insert_image(&png("wide.png"), &StubUploader::new(900, 600))
        .expect("image inserted");
    assert_eq!((inserted.width, inserted.height), (Some(300), Some(200)));
    assert_eq!(fixture.goals.inserted_images().len(), 1);
    assert!(fixture.features.inserted_images().is_empty());
}

#[test]
fn failed_upload_inserts_nothing_and_notifies() {
    let mut fixture = overview();
    fixture.session.begin_image_insert();

    let uploader = StubUploader::failing();
    assert!(fixture.session.insert_image(&png("x.png"), &uploader).is_none());

    assert_eq!(uploader.uploads.get(), 1);
    assert!(fixture.features.inserted_images().is_empty());
    assert_eq!(fixture.notifier.take(), vec![IMAGE_UPLOAD_FAILED.to_string()]);
}

#[test]
fn non_image_file_is_rejected_before_upload() {
    let mut fixture = overview();
    fixture.session.begin_image_insert();
    let uploader = StubUploader::new(10, 10);
    let pdf = ImageBlob {
        file_name: "plan.pdf".to_string(),
        mime_type: "application/pdf".to_string(),
        bytes: Vec::new(),
    };

    assert!(fixture.session.insert_image(&pdf, &uploader).is_none());
    assert_eq!(uploader.uploads.get(), 0);
    assert_eq!(fixture.notifier.take(), vec![IMAGE_TYPE_REJECTED.to_string()]);
}

#[test]
fn pasted_image_is_uploaded_into_the_pasted_editor() {
    let mut fixture = overview();
    let uploader = StubUploader::new(200, 100);
    let items = vec![
        ClipboardItem {
            mime_type: "text/plain".to_string(),
            file: None,
        },
        ClipboardItem {
            mime_type: "image/png".to_string(),
            file: Some(png("clip.png")),
        },
    ];

    assert!(fixture.session.handle_paste(SlotName::Goals, &items, &uploader));
    assert_eq!(fixture.goals.inserted_images().len(), 1);
    assert_eq!(fixture.goals.inserted_images()[0].width, Some(200));
}

#[test]
fn text_paste_and_single_line_paste_pass_through() {
    let mut fixture = overview();
    let uploader = StubUploader::new(200, 100);
    let text_only = vec![ClipboardItem {
        mime_type: "text/plain".to_string(),
        file: None,
    }];
    let image = vec![ClipboardItem {
        mime_type: "image/png".to_string(),
        file: Some(png("clip.png")),
    }];

    assert!(!fixture.session.handle_paste(SlotName::Features, &text_only, &uploader));
    assert!(!fixture.session.handle_paste(SlotName::ItemName, &image, &uploader));
    assert_eq!(uploader.uploads.get(), 0);
    assert!(fixture.name.inserted_images().is_empty());
}

#[test]
fn insert_without_any_target_is_a_no_op() {
    let mut fixture = overview();
    assert!(fixture
        .session
        .insert_image(&png("x.png"), &StubUploader::new(1, 1))
        .is_none());

    fixture.session.teardown();
    assert!(!fixture.session.begin_image_insert());
}
