//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::Utc;
use folio_core::{
  book::{Book, ChangeEntry, Chapter, NewBook, NewChapter, NewParagraph, Paragraph},
  ledger::{ChapterBreakdown, ComparisonType, NewComparison},
  store::BookStore,
  version::{NewSnapshot, NewVersion, SourceType},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn book(s: &SqliteStore, code: &str) -> Book {
  s.insert_book(NewBook {
    title:    format!("Libro {code}"),
    code:     code.into(),
    language: "es".into(),
  })
  .await
  .unwrap()
}

async fn chapter(s: &SqliteStore, book_id: Uuid, number: u32) -> Chapter {
  s.insert_chapter(NewChapter { book_id, number, title: format!("Capítulo {number}") })
    .await
    .unwrap()
}

async fn paragraph(s: &SqliteStore, chapter_id: Uuid, n: u32, code: &str, text: &str) -> Paragraph {
  s.insert_paragraph(NewParagraph {
    chapter_id,
    paragraph_number: n,
    refcode: Some(code.into()),
    text: text.into(),
  })
  .await
  .unwrap()
}

fn snapshot(p: &Paragraph, text: &str) -> NewSnapshot {
  NewSnapshot { paragraph_id: p.paragraph_id, text: text.into() }
}

// ─── Books ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_get_book() {
  let s = store().await;
  let b = book(&s, "DTG").await;
  assert_eq!(b.total_changes, 0);
  assert!(b.last_check_date.is_none());

  let fetched = s.get_book(b.book_id).await.unwrap().unwrap();
  assert_eq!(fetched.code, "DTG");
  assert_eq!(fetched.language, "es");

  let by_code = s.find_book_by_code("DTG").await.unwrap().unwrap();
  assert_eq!(by_code.book_id, b.book_id);
}

#[tokio::test]
async fn get_book_missing_returns_none() {
  let s = store().await;
  assert!(s.get_book(Uuid::new_v4()).await.unwrap().is_none());
  assert!(s.find_book_by_code("NOPE").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_book_code_is_rejected() {
  let s = store().await;
  book(&s, "CS").await;

  let err = s
    .insert_book(NewBook { title: "Otro".into(), code: "CS".into(), language: "es".into() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(folio_core::Error::DuplicateBookCode(ref c)) if c == "CS"));
  assert_eq!(s.list_books().await.unwrap().len(), 1);
}

#[tokio::test]
async fn delete_book_cascades() {
  let s = store().await;
  let b = book(&s, "PP").await;
  let c = chapter(&s, b.book_id, 1).await;
  let p = paragraph(&s, c.chapter_id, 1, "PP 1.1", "Dios es amor.").await;
  let v = s
    .create_version(NewVersion::new(
      b.book_id,
      SourceType::InitialImport,
      true,
      vec![snapshot(&p, "Dios es amor.")],
    ))
    .await
    .unwrap();
  s.append_comparison(NewComparison::marker(b.book_id, ComparisonType::InitialImport, None))
    .await
    .unwrap();

  assert!(s.delete_book(b.book_id).await.unwrap());
  assert!(!s.delete_book(b.book_id).await.unwrap());

  assert!(s.get_chapter(c.chapter_id).await.unwrap().is_none());
  assert!(s.get_paragraph(p.paragraph_id).await.unwrap().is_none());
  assert!(s.get_version(v.version_id).await.unwrap().is_none());
  assert!(s.list_snapshots(v.version_id).await.unwrap().is_empty());
  assert!(s.list_comparisons(b.book_id).await.unwrap().is_empty());
}

// ─── Chapters & paragraphs ───────────────────────────────────────────────────

#[tokio::test]
async fn chapters_are_listed_by_number() {
  let s = store().await;
  let b = book(&s, "DTG").await;
  chapter(&s, b.book_id, 3).await;
  chapter(&s, b.book_id, 1).await;
  chapter(&s, b.book_id, 2).await;

  let numbers: Vec<u32> =
    s.list_chapters(b.book_id).await.unwrap().iter().map(|c| c.number).collect();
  assert_eq!(numbers, vec![1, 2, 3]);
}

#[tokio::test]
async fn new_paragraph_is_unchanged() {
  let s = store().await;
  let b = book(&s, "DTG").await;
  let c = chapter(&s, b.book_id, 1).await;
  let p = paragraph(&s, c.chapter_id, 1, "DTG 1.1", "En el principio era el Verbo.").await;

  let fetched = s.get_paragraph(p.paragraph_id).await.unwrap().unwrap();
  assert_eq!(fetched.base_text, fetched.latest_text);
  assert!(!fetched.has_changed);
  assert!(fetched.change_history.is_empty());
  assert_eq!(fetched.refcode.as_deref(), Some("DTG 1.1"));
}

#[tokio::test]
async fn book_paragraphs_follow_chapter_order() {
  let s = store().await;
  let b = book(&s, "DTG").await;
  let c2 = chapter(&s, b.book_id, 2).await;
  let c1 = chapter(&s, b.book_id, 1).await;
  paragraph(&s, c2.chapter_id, 1, "DTG 2.1", "b").await;
  paragraph(&s, c1.chapter_id, 2, "DTG 1.2", "a2").await;
  paragraph(&s, c1.chapter_id, 1, "DTG 1.1", "a1").await;

  let codes: Vec<String> = s
    .list_book_paragraphs(b.book_id)
    .await
    .unwrap()
    .into_iter()
    .filter_map(|p| p.refcode)
    .collect();
  assert_eq!(codes, vec!["DTG 1.1", "DTG 1.2", "DTG 2.1"]);
}

#[tokio::test]
async fn apply_change_appends_history() {
  let s = store().await;
  let b = book(&s, "CS").await;
  let c = chapter(&s, b.book_id, 3).await;
  let p = paragraph(&s, c.chapter_id, 2, "CS 3.2", "Texto original").await;

  let first = ChangeEntry {
    date:     Utc::now(),
    old_text: "Texto original".into(),
    new_text: "Texto revisado".into(),
  };
  assert!(s.apply_change(p.paragraph_id, first).await.unwrap());

  let second = ChangeEntry {
    date:     Utc::now(),
    old_text: "Texto revisado".into(),
    new_text: "Texto final".into(),
  };
  assert!(s.apply_change(p.paragraph_id, second).await.unwrap());

  let fetched = s.get_paragraph(p.paragraph_id).await.unwrap().unwrap();
  assert!(fetched.has_changed);
  assert_eq!(fetched.base_text, "Texto original");
  assert_eq!(fetched.latest_text, "Texto final");
  assert_eq!(fetched.change_history.len(), 2);
  assert_eq!(fetched.change_history.entries[0].new_text, "Texto revisado");
  assert!(fetched.change_history.is_replayable_from("Texto original"));
}

#[tokio::test]
async fn apply_change_to_missing_paragraph_returns_false() {
  let s = store().await;
  let entry = ChangeEntry { date: Utc::now(), old_text: "a".into(), new_text: "b".into() };
  assert!(!s.apply_change(Uuid::new_v4(), entry).await.unwrap());
}

// ─── Counters ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn counters_accumulate() {
  let s = store().await;
  let b = book(&s, "DTG").await;
  let c = chapter(&s, b.book_id, 1).await;

  let at = Utc::now();
  s.add_chapter_changes(c.chapter_id, 2, at).await.unwrap();
  s.add_chapter_changes(c.chapter_id, 3, at).await.unwrap();
  s.record_book_check(b.book_id, 5, at).await.unwrap();
  s.record_book_check(b.book_id, 0, at).await.unwrap();

  let c = s.get_chapter(c.chapter_id).await.unwrap().unwrap();
  assert_eq!(c.change_count, 5);

  let b = s.get_book(b.book_id).await.unwrap().unwrap();
  assert_eq!(b.total_changes, 5);
  assert!(b.last_check_date.is_some());
}

#[tokio::test]
async fn concurrent_counter_increments_are_not_lost() {
  let s = store().await;
  let b = book(&s, "DTG").await;
  let c = chapter(&s, b.book_id, 1).await;

  let mut handles = Vec::new();
  for _ in 0..10 {
    let s = s.clone();
    let chapter_id = c.chapter_id;
    handles.push(tokio::spawn(async move {
      s.add_chapter_changes(chapter_id, 1, Utc::now()).await.unwrap();
    }));
  }
  for h in handles {
    h.await.unwrap();
  }

  let c = s.get_chapter(c.chapter_id).await.unwrap().unwrap();
  assert_eq!(c.change_count, 10);
}

// ─── Versions ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn versions_are_numbered_per_book() {
  let s = store().await;
  let a = book(&s, "AA").await;
  let b = book(&s, "BB").await;

  let v1 = s
    .create_version(NewVersion::new(a.book_id, SourceType::InitialImport, true, vec![]))
    .await
    .unwrap();
  let v2 = s
    .create_version(NewVersion::new(a.book_id, SourceType::PeriodicRecheck, false, vec![]))
    .await
    .unwrap();
  let other = s
    .create_version(NewVersion::new(b.book_id, SourceType::InitialImport, true, vec![]))
    .await
    .unwrap();

  assert_eq!(v1.version_number, 1);
  assert_eq!(v2.version_number, 2);
  assert_eq!(other.version_number, 1);
}

#[tokio::test]
async fn at_most_one_baseline_per_book() {
  let s = store().await;
  let b = book(&s, "DTG").await;
  let c = chapter(&s, b.book_id, 1).await;
  let p = paragraph(&s, c.chapter_id, 1, "DTG 1.1", "uno").await;

  s.create_version(NewVersion::new(
    b.book_id,
    SourceType::InitialImport,
    true,
    vec![snapshot(&p, "uno")],
  ))
  .await
  .unwrap();
  let manual = s
    .create_version(NewVersion {
      edition_date: chrono::NaiveDate::from_ymd_opt(1898, 1, 1),
      notes: Some("Edición impresa".into()),
      ..NewVersion::new(
        b.book_id,
        SourceType::ManualHistorical,
        true,
        vec![snapshot(&p, "uno impreso")],
      )
    })
    .await
    .unwrap();

  let versions = s.list_versions(b.book_id).await.unwrap();
  let baselines: Vec<_> = versions.iter().filter(|v| v.is_baseline).collect();
  assert_eq!(baselines.len(), 1);
  assert_eq!(baselines[0].version_id, manual.version_id);
  assert_eq!(baselines[0].edition_date, chrono::NaiveDate::from_ymd_opt(1898, 1, 1));

  let p = s.get_paragraph(p.paragraph_id).await.unwrap().unwrap();
  assert_eq!(p.base_text, "uno impreso");
  assert_eq!(p.latest_text, "uno");
}

#[tokio::test]
async fn set_baseline_rewrites_covered_base_texts() {
  let s = store().await;
  let b = book(&s, "DTG").await;
  let c = chapter(&s, b.book_id, 1).await;
  let p1 = paragraph(&s, c.chapter_id, 1, "DTG 1.1", "uno").await;
  let p2 = paragraph(&s, c.chapter_id, 2, "DTG 1.2", "dos").await;

  let v1 = s
    .create_version(NewVersion::new(
      b.book_id,
      SourceType::InitialImport,
      true,
      vec![snapshot(&p1, "uno"), snapshot(&p2, "dos")],
    ))
    .await
    .unwrap();
  let v2 = s
    .create_version(NewVersion::new(
      b.book_id,
      SourceType::ManualHistorical,
      false,
      vec![snapshot(&p1, "uno antiguo")],
    ))
    .await
    .unwrap();

  let audit = NewComparison::marker(
    b.book_id,
    ComparisonType::BaselineChange,
    Some("v1 -> v2".into()),
  );
  let (change, record) = s
    .set_baseline(b.book_id, v2.version_id, audit)
    .await
    .unwrap()
    .unwrap();

  assert_eq!(change.previous.as_ref().map(|v| v.version_id), Some(v1.version_id));
  assert!(!change.previous.unwrap().is_baseline);
  assert!(change.current.is_baseline);
  assert_eq!(change.paragraphs_updated, 1);
  assert_eq!(change.paragraphs_uncovered, 1);
  assert_eq!(record.comparison_type, ComparisonType::BaselineChange);
  assert_eq!(record.total_changes, 0);

  let p1 = s.get_paragraph(p1.paragraph_id).await.unwrap().unwrap();
  let p2 = s.get_paragraph(p2.paragraph_id).await.unwrap().unwrap();
  assert_eq!(p1.base_text, "uno antiguo");
  assert_eq!(p2.base_text, "dos");

  let baselines: Vec<_> = s
    .list_versions(b.book_id)
    .await
    .unwrap()
    .into_iter()
    .filter(|v| v.is_baseline)
    .collect();
  assert_eq!(baselines.len(), 1);
  assert_eq!(baselines[0].version_id, v2.version_id);

  let ledger = s.list_comparisons(b.book_id).await.unwrap();
  assert_eq!(ledger.len(), 1);
  assert_eq!(ledger[0].notes.as_deref(), Some("v1 -> v2"));
}

#[tokio::test]
async fn set_baseline_for_foreign_version_changes_nothing() {
  let s = store().await;
  let a = book(&s, "AA").await;
  let b = book(&s, "BB").await;
  let va = s
    .create_version(NewVersion::new(a.book_id, SourceType::InitialImport, true, vec![]))
    .await
    .unwrap();
  let vb = s
    .create_version(NewVersion::new(b.book_id, SourceType::InitialImport, true, vec![]))
    .await
    .unwrap();

  let audit = NewComparison::marker(a.book_id, ComparisonType::BaselineChange, None);
  let result = s.set_baseline(a.book_id, vb.version_id, audit).await.unwrap();
  assert!(result.is_none());

  let va = s.get_version(va.version_id).await.unwrap().unwrap();
  assert!(va.is_baseline);
  assert!(s.list_comparisons(a.book_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn snapshots_round_trip() {
  let s = store().await;
  let b = book(&s, "DTG").await;
  let c = chapter(&s, b.book_id, 1).await;
  let p1 = paragraph(&s, c.chapter_id, 1, "DTG 1.1", "uno").await;
  let p2 = paragraph(&s, c.chapter_id, 2, "DTG 1.2", "dos").await;

  let v = s
    .create_version(NewVersion::new(
      b.book_id,
      SourceType::TestSeed,
      false,
      vec![snapshot(&p1, "uno"), snapshot(&p2, "dos")],
    ))
    .await
    .unwrap();

  let snaps = s.list_snapshots(v.version_id).await.unwrap();
  assert_eq!(snaps.len(), 2);
  assert_eq!(snaps[0].paragraph_id, p1.paragraph_id);
  assert_eq!(snaps[1].text, "dos");
  assert!(snaps.iter().all(|sn| sn.version_id == v.version_id));
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn comparisons_keep_breakdown_and_order() {
  let s = store().await;
  let b = book(&s, "DTG").await;
  let c = chapter(&s, b.book_id, 4).await;

  s.append_comparison(NewComparison::marker(b.book_id, ComparisonType::InitialImport, None))
    .await
    .unwrap();
  s.append_comparison(NewComparison {
    book_id:                 b.book_id,
    comparison_type:         ComparisonType::PeriodicRecheck,
    total_changes:           3,
    changed_paragraph_count: 3,
    chapters_affected:       vec![ChapterBreakdown {
      chapter_id:     c.chapter_id,
      chapter_number: 4,
      change_count:   3,
    }],
    notes:                   None,
  })
  .await
  .unwrap();

  let ledger = s.list_comparisons(b.book_id).await.unwrap();
  assert_eq!(ledger.len(), 2);
  assert_eq!(ledger[0].comparison_type, ComparisonType::InitialImport);
  assert_eq!(ledger[1].total_changes, 3);
  assert_eq!(ledger[1].chapters_affected[0].chapter_number, 4);
}

#[tokio::test]
async fn amend_notes_leaves_counts_untouched() {
  let s = store().await;
  let b = book(&s, "DTG").await;
  let rec = s
    .append_comparison(NewComparison {
      total_changes: 7,
      changed_paragraph_count: 7,
      ..NewComparison::marker(b.book_id, ComparisonType::PeriodicRecheck, None)
    })
    .await
    .unwrap();

  let amended = s
    .amend_comparison_notes(rec.comparison_id, Some("revisado".into()))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(amended.notes.as_deref(), Some("revisado"));
  assert_eq!(amended.total_changes, 7);

  assert!(s
    .amend_comparison_notes(Uuid::new_v4(), None)
    .await
    .unwrap()
    .is_none());
}
