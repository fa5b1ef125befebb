// Tests for board lookup and name -> id resolution.
mod common;

use common::{BOARD_URL, FakeBoard, SHORT_LINK};
use docboard::board::{BoardContext, ResolutionWarning, extract_board_ref};
use docboard::error::RunError;

#[test]
fn test_extracts_short_link_from_board_urls() {
    assert_eq!(extract_board_ref(BOARD_URL).unwrap(), SHORT_LINK);
    assert_eq!(
        extract_board_ref("http://www.trello.com/board/AbCd1234/").unwrap(),
        SHORT_LINK
    );
    assert!(matches!(
        extract_board_ref("https://trello.com/c/AbCd1234"),
        Err(RunError::InvalidBoardUrl(_))
    ));
}

#[tokio::test]
async fn test_build_reads_lists_in_board_order() {
    let api = FakeBoard::sample();
    let ctx = BoardContext::build(&api, SHORT_LINK, None).await.unwrap();
    assert_eq!(ctx.board_id, "board-1");
    assert_eq!(ctx.board_name, "Sprint Board");
    let names: Vec<&str> = ctx.lists.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["To Do", "Backlog"]);
    assert_eq!(ctx.default_list.as_ref().map(|l| l.id.as_str()), Some("list-todo"));
}

#[tokio::test]
async fn test_configured_default_list() {
    let api = FakeBoard::sample();
    let ctx = BoardContext::build(&api, SHORT_LINK, Some("backlog"))
        .await
        .unwrap();
    assert_eq!(
        ctx.default_list.as_ref().map(|l| l.id.as_str()),
        Some("list-backlog")
    );

    let ctx = BoardContext::build(&api, SHORT_LINK, Some("Archive"))
        .await
        .unwrap();
    assert_eq!(ctx.default_list, None);
    assert!(ctx.resolve_list(Some("Doing")).is_err());
    assert_eq!(
        ctx.resolve_list(Some("To Do")).unwrap(),
        ("list-todo".to_string(), None)
    );
}

#[tokio::test]
async fn test_unknown_list_falls_back_with_warning() {
    let api = FakeBoard::sample();
    let ctx = BoardContext::build(&api, SHORT_LINK, None).await.unwrap();

    let (id, warning) = ctx.resolve_list(Some("Doing")).unwrap();
    assert_eq!(id, "list-todo");
    assert_eq!(
        warning,
        Some(ResolutionWarning::ListFallback {
            requested: "Doing".to_string(),
            fallback: "To Do".to_string(),
        })
    );

    assert_eq!(
        ctx.resolve_list(None).unwrap(),
        ("list-todo".to_string(), None)
    );
    assert_eq!(
        ctx.resolve_list(Some("BACKLOG")).unwrap(),
        ("list-backlog".to_string(), None)
    );
}

#[tokio::test]
async fn test_labels_and_members_resolution() {
    let api = FakeBoard::sample();
    let ctx = BoardContext::build(&api, SHORT_LINK, None).await.unwrap();

    let (ids, warnings) = ctx.resolve_labels(&[
        "urgent".to_string(),
        "Unknown".to_string(),
        "Urgent".to_string(),
    ]);
    assert_eq!(ids, vec!["label-urgent"]);
    assert_eq!(
        warnings,
        vec![ResolutionWarning::UnknownLabel("Unknown".to_string())]
    );

    let (ids, warnings) =
        ctx.resolve_members(&["@Username1".to_string(), "ghost".to_string()]);
    assert_eq!(ids, vec!["member-1"]);
    assert_eq!(
        warnings,
        vec![ResolutionWarning::UnknownMember("ghost".to_string())]
    );
}

#[tokio::test]
async fn test_denied_board_is_an_auth_failure() {
    let mut api = FakeBoard::sample();
    api.deny_access = true;
    let err = BoardContext::build(&api, SHORT_LINK, None).await.unwrap_err();
    assert!(matches!(err, RunError::Unauthorized(_)));

    let api = FakeBoard::sample();
    let err = BoardContext::build(&api, "ZzZz9999", None).await.unwrap_err();
    assert!(matches!(err, RunError::BoardUnavailable(_)));
}
