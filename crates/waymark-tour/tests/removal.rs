//! Spot removal keeps indices, cursor and document structure consistent.

use waymark_core::document::{Document, NodeId};
use waymark_core::event::TourId;
use waymark_core::geometry::{Rect, Size};
use waymark_core::memory::MemoryDocument;
use waymark_tour::{Guide, SpotBuilder, TourError};

fn guide(spots: usize) -> (Guide<MemoryDocument>, TourId, Vec<NodeId>) {
    let mut doc = MemoryDocument::new(Size::new(1024.0, 768.0));
    let root = doc.root();
    let nodes: Vec<_> = (0..spots)
        .map(|i| {
            let n = doc.insert(root, "li");
            doc.set_rect(n, Rect::new(0.0, 30.0 * i as f64, 100.0, 20.0));
            n
        })
        .collect();
    let mut guide = Guide::new(doc);
    let id = guide.tour("removal");
    let mut tour = guide.tour_mut(id).unwrap();
    for &n in &nodes {
        tour.add_spot(SpotBuilder::node(n)).unwrap();
    }
    (guide, id, nodes)
}

#[test]
fn removing_current_clears_cursor() {
    let (mut guide, id, _) = guide(3);
    let mut tour = guide.tour_mut(id).unwrap();
    tour.start().unwrap();
    tour.next().unwrap();
    let current = tour.tour().current_id().unwrap();

    tour.remove_spot(current).unwrap();
    assert_eq!(tour.tour().cursor(), None);
    assert_eq!(tour.tour().current_id(), None);
    assert_eq!(tour.tour().len(), 2);

    // Navigation keeps working from the unset cursor.
    assert!(!tour.prev().unwrap());
    assert!(tour.next().unwrap());
    assert_eq!(tour.tour().cursor(), Some(0));
}

#[test]
fn removing_previous_clears_previous() {
    let (mut guide, id, _) = guide(3);
    let mut tour = guide.tour_mut(id).unwrap();
    tour.start().unwrap();
    tour.next().unwrap();
    let previous = tour.tour().previous_id().unwrap();
    tour.remove_spot(previous).unwrap();
    assert_eq!(tour.tour().previous_id(), None);
    assert_eq!(tour.tour().cursor(), Some(0));
}

#[test]
fn later_indices_shift_down() {
    let (mut guide, id, _) = guide(4);
    let mut tour = guide.tour_mut(id).unwrap();
    tour.start().unwrap();
    tour.last().unwrap();
    let second = tour.tour().spot(1).unwrap().id();
    tour.remove_spot(second).unwrap();

    let indices: Vec<_> = tour.tour().spots().iter().map(|s| s.index()).collect();
    assert_eq!(indices, [0, 1, 2]);
    assert_eq!(tour.tour().cursor(), Some(2));
    assert_eq!(
        tour.tour().current_id(),
        tour.tour().spot(2).map(|s| s.id())
    );
}

#[test]
fn removing_unknown_spot_is_bad_spot() {
    let (mut guide, id, _) = guide(2);
    let mut tour = guide.tour_mut(id).unwrap();
    let gone = tour.tour().spot(0).unwrap().id();
    tour.remove_spot(gone).unwrap();
    assert!(matches!(
        tour.remove_spot(gone),
        Err(TourError::BadSpot { .. })
    ));
}

#[test]
fn removal_unwraps_sibling_markers() {
    let (mut guide, id, nodes) = guide(2);
    let root = guide.doc().root();
    let before = guide.doc().live_nodes();
    let mut tour = guide.tour_mut(id).unwrap();
    tour.start().unwrap();
    assert!(tour.tour().spots().iter().all(|s| s.marker().is_some()));

    let first = tour.tour().spot(0).unwrap().id();
    tour.remove_spot(first).unwrap();
    assert_eq!(guide.doc().parent(nodes[0]), Some(root));
    assert!(!guide.doc().has_class(nodes[0], "wm-highlighted"));
    assert!(!guide.doc().has_class(nodes[0], "wm-focused"));
    assert!(!guide.doc().has_class(nodes[0], "wm-marked-sibling-right"));

    let mut tour = guide.tour_mut(id).unwrap();
    tour.reset().unwrap();
    assert!(tour.tour().is_empty());
    assert!(!tour.tour().is_active());
    assert_eq!(guide.doc().live_nodes(), before);
    assert!(guide.active_tour().is_none());
}

#[test]
fn numbered_markers_are_relabelled_after_removal() {
    let (mut guide, id, _) = guide(3);
    let root = guide.doc().root();
    let last = guide.doc_mut().insert(root, "li");
    let mut tour = guide.tour_mut(id).unwrap();
    tour.add_spot(SpotBuilder::node(last).caption("Done").text("All set"))
        .unwrap();
    tour.start().unwrap();

    let element = |guide: &Guide<MemoryDocument>, index: usize| {
        guide
            .get_tour(id)
            .and_then(|t| t.spot(index))
            .and_then(|s| s.marker())
            .and_then(|m| m.element())
            .unwrap()
    };
    let labels = |guide: &Guide<MemoryDocument>| {
        (0..3)
            .map(|i| guide.doc().text(element(guide, i)).unwrap_or("").to_owned())
            .collect::<Vec<_>>()
    };
    assert_eq!(labels(&guide), ["1", "2", "3"]);
    let captioned = element(&guide, 3);

    let first = guide.get_tour(id).unwrap().spot(0).unwrap().id();
    guide.tour_mut(id).unwrap().remove_spot(first).unwrap();
    assert_eq!(labels(&guide), ["1", "2", "Done"]);
    // Content that does not show the position keeps its element.
    assert_eq!(element(&guide, 2), captioned);
}

#[test]
fn spots_added_while_active_are_highlighted() {
    let (mut guide, id, _) = guide(1);
    let root = guide.doc().root();
    let extra = guide.doc_mut().insert(root, "li");
    let mut tour = guide.tour_mut(id).unwrap();
    tour.start().unwrap();
    let spot = tour.add_spot(SpotBuilder::node(extra)).unwrap();
    let spot = tour.tour().spot_by_id(spot).unwrap();
    assert!(spot.is_highlighted());
    assert!(spot.marker().is_some_and(|m| m.is_shown()));
}
