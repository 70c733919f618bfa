mod common;

use std::sync::Arc;

use common::{OfflineRepository, ScriptedRepository};
use services::{CategoryPicker, PickerError};
use storage::repository::{CategoryRepository, NewCategoryRecord};
use study_core::model::{CategoryId, CategoryName};
use study_core::pending::CategoryDraft;

async fn seed(repo: &ScriptedRepository, name: &str) -> CategoryId {
    repo.inner
        .create_category(NewCategoryRecord::new(
            CategoryName::new(name).unwrap(),
            None,
            None,
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn save_all_creates_selects_and_clears_drafts() {
    let repo = ScriptedRepository::default();
    let law = seed(&repo, "Direito").await;
    let mut picker = CategoryPicker::new(Arc::new(repo.clone()));
    picker.reload().await.unwrap();
    picker.toggle(&law);

    let penal = picker
        .add_draft(CategoryDraft::new("Penal").under(law.clone()))
        .unwrap();
    picker
        .add_draft(CategoryDraft::new("Parte Geral").under(penal))
        .unwrap();
    picker.add_draft(CategoryDraft::new("Português")).unwrap();

    let report = picker.save_all().await.unwrap();

    assert_eq!(report.success_count, 3);
    assert!(picker.pending().is_empty());
    assert_eq!(picker.forest().walk().count(), 4);
    assert_eq!(
        picker.category_field(),
        "Direito,Penal,Parte Geral,Português"
    );
    assert!(picker.selection().is_upward_closed(picker.forest()));
}

#[tokio::test]
async fn saving_under_an_unselected_category_selects_its_ancestors() {
    let repo = ScriptedRepository::default();
    let law = seed(&repo, "Direito").await;
    let mut picker = CategoryPicker::new(Arc::new(repo));
    picker.reload().await.unwrap();

    let penal = picker
        .add_draft(CategoryDraft::new("Penal").under(law.clone()))
        .unwrap();
    picker
        .add_draft(CategoryDraft::new("Parte Geral").under(penal))
        .unwrap();
    let report = picker.save_all().await.unwrap();

    assert_eq!(report.success_count, 2);
    assert!(picker.selection().contains(&law));
    assert!(picker.selection().is_upward_closed(picker.forest()));
    assert_eq!(picker.category_field(), "Direito,Penal,Parte Geral");
}

#[tokio::test]
async fn partial_save_selects_only_what_was_created() {
    let repo = ScriptedRepository::refusing(&["Civil"]);
    let mut picker = CategoryPicker::new(Arc::new(repo.clone()));
    picker.reload().await.unwrap();

    let civil = picker.add_draft(CategoryDraft::new("Civil")).unwrap();
    picker
        .add_draft(CategoryDraft::new("Contratos").under(civil))
        .unwrap();
    picker.add_draft(CategoryDraft::new("Penal")).unwrap();

    let report = picker.save_all().await.unwrap();

    assert_eq!(
        (report.success_count, report.error_count, report.skipped_count),
        (1, 1, 1)
    );
    assert!(picker.pending().is_empty());
    assert_eq!(picker.selected_names(), vec!["Penal"]);
}

#[tokio::test]
async fn nothing_created_keeps_the_drafts() {
    let repo = ScriptedRepository::refusing(&["Civil"]);
    let mut picker = CategoryPicker::new(Arc::new(repo));
    picker.add_draft(CategoryDraft::new("Civil")).unwrap();

    let report = picker.save_all().await.unwrap();

    assert_eq!(report.error_count, 1);
    assert_eq!(picker.pending().count(), 1);
    assert!(picker.selection().is_empty());
}

#[tokio::test]
async fn unreachable_service_surfaces_on_reload() {
    let mut picker = CategoryPicker::new(Arc::new(OfflineRepository));
    let err = picker.reload().await.unwrap_err();
    assert!(matches!(err, PickerError::Storage(_)));
    assert!(picker.forest().is_empty());
}
