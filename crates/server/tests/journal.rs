mod common;

use daybook_api::{Category, CreateTaskRequest, Priority, WipeResponse};
use daybook_api_client::ApiStatusError;

use common::{spawn, spawn_with, test_config};

#[tokio::test]
async fn moods_list_newest_first() {
    let server = spawn().await;
    let (client, auth) = server.register_user().await;

    for mood in ["😴", "🙂", "🚀"] {
        let entry = client.log_mood(mood).await.unwrap();
        assert_eq!(entry.user_id, auth.user.id);
    }
    let moods: Vec<String> = client
        .list_moods()
        .await
        .unwrap()
        .into_iter()
        .map(|m| m.mood)
        .collect();
    assert_eq!(moods, ["🚀", "🙂", "😴"]);

    let err = client.log_mood("   ").await.unwrap_err();
    assert_eq!(ApiStatusError::status_of(&err), Some(400));
}

#[tokio::test]
async fn gratitude_create_list_delete() {
    let server = spawn().await;
    let (client, _) = server.register_user().await;

    let first = client.add_gratitude("sunny morning").await.unwrap();
    let second = client.add_gratitude("  good coffee  ").await.unwrap();
    assert_eq!(second.content, "good coffee");

    let listed = client.list_gratitude().await.unwrap();
    assert_eq!(listed, vec![second.clone(), first.clone()]);

    client.delete_gratitude(first.id).await.unwrap();
    assert_eq!(client.list_gratitude().await.unwrap(), vec![second]);

    let err = client.delete_gratitude(first.id).await.unwrap_err();
    assert_eq!(ApiStatusError::status_of(&err), Some(404));
}

#[tokio::test]
async fn notes_are_private_and_separate_from_gratitude() {
    let server = spawn().await;
    let (alice, _) = server.register_user().await;
    let (bob, _) = server.register_user().await;

    let note = alice.add_note("call the plumber").await.unwrap();
    assert!(alice.list_gratitude().await.unwrap().is_empty());
    assert!(bob.list_notes().await.unwrap().is_empty());

    let err = bob.delete_note(note.id).await.unwrap_err();
    assert_eq!(ApiStatusError::status_of(&err), Some(404));
    assert_eq!(alice.list_notes().await.unwrap(), vec![note]);

    let resp = reqwest::Client::new()
        .delete(server.url("/notes/abc"))
        .bearer_auth(alice.auth_token().unwrap())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn self_wipe_clears_only_the_caller() {
    let server = spawn().await;
    let (alice, _) = server.register_user().await;
    let (bob, _) = server.register_user().await;

    for client in [&alice, &bob] {
        client
            .create_task(
                Category::Today,
                &CreateTaskRequest {
                    content: "task".into(),
                    priority: Priority::Neutral,
                    estimated_time: None,
                },
            )
            .await
            .unwrap();
        client.log_mood("🙂").await.unwrap();
        client.add_gratitude("friends").await.unwrap();
        client.add_note("note").await.unwrap();
        client.add_note("another").await.unwrap();
    }

    let wiped = alice.wipe_my_data().await.unwrap();
    assert_eq!(
        wiped,
        WipeResponse {
            tasks: 1,
            moods: 1,
            gratitude: 1,
            notes: 2,
        }
    );
    assert!(alice.list_tasks(Category::Today).await.unwrap().is_empty());
    assert!(alice.list_notes().await.unwrap().is_empty());
    // account and session survive
    alice.me().await.unwrap();

    assert_eq!(bob.list_notes().await.unwrap().len(), 2);
    assert_eq!(bob.list_moods().await.unwrap().len(), 1);
}

#[tokio::test]
async fn global_wipe_needs_the_admin_key() {
    let disabled = spawn().await;
    let err = disabled.client().admin_wipe("anything").await.unwrap_err();
    assert_eq!(ApiStatusError::status_of(&err), Some(403));

    let mut config = test_config();
    config.admin_key = "s3cret".into();
    let server = spawn_with(config).await;
    let (alice, _) = server.register_user().await;
    alice.add_note("keep me?").await.unwrap();
    alice.log_mood("🙂").await.unwrap();

    let err = server.client().admin_wipe("guess").await.unwrap_err();
    assert_eq!(ApiStatusError::status_of(&err), Some(401));
    assert_eq!(alice.list_notes().await.unwrap().len(), 1);

    let wiped = server.client().admin_wipe("s3cret").await.unwrap();
    assert_eq!(wiped.notes, 1);
    assert_eq!(wiped.moods, 1);
    assert!(alice.list_notes().await.unwrap().is_empty());
    alice.me().await.unwrap();
}
