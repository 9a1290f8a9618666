//! Frame → host → capture round trips through the public API.
#![allow(clippy::float_cmp)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use pointshoot::capture::{Capturer, Downloaded, Downloader, MemoryFileStorage, NoteItem, NoteStore};
use pointshoot::dom::{DomStore, NodeId};
use pointshoot::engine::{Action, EngineCore, Status};
use pointshoot::error::{DownloadError, NoteError};
use pointshoot::frames::FrameInfo;
use pointshoot::geom::{Point, Rect};
use pointshoot::input::{ModifierKey, Modifiers};
use pointshoot::target::Confirmation;
use pointshoot::tracker::FrameTracker;

const HOST: &str = "https://host.example/";
const FRAME: &str = "https://frame.example/embed";

struct NoNetwork;

#[async_trait::async_trait]
impl Downloader for NoNetwork {
    async fn download(&self, url: &str, _headers: &[(String, String)]) -> Result<Downloaded, DownloadError> {
        Err(DownloadError::Status { url: url.to_string(), status: 404 })
    }
}

#[derive(Default)]
struct Notes {
    added: Mutex<HashMap<String, Vec<NoteItem>>>,
}

#[async_trait::async_trait]
impl NoteStore for Notes {
    async fn get_note(&self, title: &str) -> Result<String, NoteError> {
        Ok(format!("id:{title}"))
    }

    async fn add_to_note(&self, note_id: &str, items: &[NoteItem]) -> Result<(), NoteError> {
        self.added.lock().unwrap().entry(note_id.to_string()).or_default().extend_from_slice(items);
        Ok(())
    }
}

fn framed_engine() -> EngineCore {
    let mut core = EngineCore::default();
    core.register_frame(FrameInfo::root(HOST));
    core.register_frame(FrameInfo::child(FRAME, HOST, 100.0, 50.0));
    core
}

fn page() -> (DomStore, NodeId, NodeId) {
    let mut dom = DomStore::new();
    let body = dom.add_element(None, "body", Rect::new(0.0, 0.0, 800.0, 600.0));
    let first = dom.add_element(Some(body), "p", Rect::new(10.0, 10.0, 400.0, 20.0));
    dom.add_text(first, "Hello", Rect::new(10.0, 10.0, 50.0, 20.0));
    let second = dom.add_element(Some(body), "p", Rect::new(10.0, 40.0, 400.0, 20.0));
    dom.add_text(second, "World", Rect::new(10.0, 40.0, 60.0, 20.0));
    (dom, first, second)
}

fn deliver(core: &mut EngineCore, tracker: &mut FrameTracker, dom: &DomStore) -> Vec<Action> {
    tracker.send_bounds(dom).into_iter().flat_map(|n| core.on_message(FRAME, n)).collect()
}

#[tokio::test]
async fn point_shoot_and_collect_from_a_nested_frame() {
    let mut core = framed_engine();
    let (dom, first, _) = page();
    let mut tracker = FrameTracker::new(FRAME);

    tracker.point(first);
    deliver(&mut core, &mut tracker, &dom);
    assert_eq!(core.status(), Status::Pointing);
    let point = core.point_group().unwrap();
    assert_eq!(point.targets()[0].rect, Rect::new(110.0, 60.0, 50.0, 20.0));
    assert_eq!(point.text, "Hello");

    let action = core.refresh(Point::new(120.0, 65.0), Modifiers::only(ModifierKey::Alt));
    let Action::ShootActivated { group_id } = action else { panic!("expected activation, got {action:?}") };

    let request = core.begin_capture().unwrap();
    assert_eq!(request.html, vec!["<p>Hello</p>".to_string()]);

    let notes = Arc::new(Notes::default());
    let capturer = Capturer::new(Arc::new(NoNetwork), Arc::new(MemoryFileStorage::new()), notes.clone());
    let (confirmation, info) = capturer.capture_into_note(&request, "Host page", HOST, "Reading").await;
    assert_eq!(confirmation, Confirmation::Success);

    let action = core.finish_capture(&request, confirmation, info);
    let Action::ConfirmationShown { group_id: shown, confirmation: shown_as, duration } = action else {
        panic!("expected confirmation, got {action:?}");
    };
    assert_eq!((shown.as_str(), shown_as), (group_id.as_str(), confirmation));
    assert_eq!(duration, core.config().confirmation());
    assert_eq!(core.status(), Status::Idle);
    assert_eq!(core.collected_groups()[0].id, group_id);

    let added = notes.added.lock().unwrap();
    assert!(matches!(&added["id:Reading"][..], [NoteItem::Quote { ordinal: 1, text, .. }] if text == "Hello"));
}

#[tokio::test]
async fn frame_capture_is_attributed_to_the_host_page() {
    let mut core = framed_engine();
    let (dom, first, _) = page();
    let mut tracker = FrameTracker::new(FRAME);
    tracker.shoot(first);
    deliver(&mut core, &mut tracker, &dom);

    let request = core.begin_capture().unwrap();
    assert_eq!(request.href, FRAME);

    let notes = Arc::new(Notes::default());
    let capturer = Capturer::new(Arc::new(NoNetwork), Arc::new(MemoryFileStorage::new()), notes.clone());
    let (confirmation, _) = capturer.capture_into_note(&request, "Host page", HOST, "Reading").await;
    assert_eq!(confirmation, Confirmation::Success);

    let added = notes.added.lock().unwrap();
    let [item] = &added["id:Reading"][..] else { panic!("expected one item, got {added:?}") };
    assert_eq!(item.source().source_url, HOST);
    assert_eq!(item.source().title, "Host page");
}

#[test]
fn frame_shot_starts_a_shoot_and_removal_dismisses_it() {
    let mut core = framed_engine();
    let (mut dom, _, second) = page();
    let mut tracker = FrameTracker::new(FRAME);

    let id = tracker.shoot(second);
    let actions = deliver(&mut core, &mut tracker, &dom);
    assert!(actions.contains(&Action::ShootActivated { group_id: id.clone() }));
    assert_eq!(core.shoot_group().unwrap().targets()[0].rect, Rect::new(110.0, 90.0, 60.0, 20.0));

    dom.detach(second);
    let actions = deliver(&mut core, &mut tracker, &dom);
    assert!(actions.contains(&Action::ShootDismissed { group_id: id.clone() }));
    assert!(core.shoot_group().is_none());
    assert_eq!(core.dismissed_groups()[0].id, id);
}

#[test]
fn page_change_discards_late_capture() {
    let mut core = framed_engine();
    let (dom, first, _) = page();
    let mut tracker = FrameTracker::new(FRAME);
    tracker.shoot(first);
    deliver(&mut core, &mut tracker, &dom);

    let request = core.begin_capture().unwrap();
    core.leave_page();
    assert_eq!(core.finish_capture(&request, Confirmation::Success, None), Action::None);
    assert!(core.collected_groups().is_empty());
    assert!(core.frames().is_empty());
}
