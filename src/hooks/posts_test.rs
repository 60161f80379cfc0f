use std::time::Duration;

use super::*;
use crate::model::{PostType, Visibility};
use crate::test_helpers::{TestApp, post};

fn text_post(title: &str) -> PostForm {
    PostForm { title: title.into(), content: "Thanks for the support!".into(), ..PostForm::default() }
}

#[tokio::test]
async fn fetch_lists_campaign_posts_newest_first() {
    let app = TestApp::signed_in("u-1");
    let mut first = post("p-1", "c-1", PostType::Text, Visibility::All);
    first.created_at = "2026-02-01T00:00:00.000000Z".into();
    let mut second = post("p-2", "c-1", PostType::Image, Visibility::Premium);
    second.created_at = "2026-03-01T00:00:00.000000Z".into();
    let elsewhere = post("p-3", "c-2", PostType::Text, Visibility::All);
    for p in [&first, &second, &elsewhere] {
        app.gateway.seed_record(POSTS_TABLE, p);
    }
    let hook = CampaignPostsHook::new(&app.ctx, "c-1");

    hook.fetch().await.unwrap();

    let ids: Vec<String> = hook.posts().into_iter().map(|p| p.id).collect();
    assert_eq!(ids, vec!["p-2", "p-1"]);
}

#[tokio::test]
async fn create_publishes_and_prepends() {
    let app = TestApp::signed_in("u-1");
    app.gateway.seed_record(POSTS_TABLE, &post("p-old", "c-1", PostType::Text, Visibility::All));
    let hook = CampaignPostsHook::new(&app.ctx, "c-1");
    hook.fetch().await.unwrap();

    let mut form = text_post("Launch day");
    form.visibility = Visibility::Supporters;
    let created = hook.create_post(&form).await.unwrap();

    assert_eq!(created.campaign_id, "c-1");
    assert_eq!(created.visibility, Visibility::Supporters);
    assert!(created.media_url.is_none());
    assert_eq!(hook.posts()[0].id, created.id);
    assert_eq!(hook.posts().len(), 2);
}

#[tokio::test]
async fn media_post_without_url_is_rejected_locally() {
    let app = TestApp::signed_in("u-1");
    let hook = CampaignPostsHook::new(&app.ctx, "c-1");

    let mut form = text_post("Gallery");
    form.post_type = PostType::Image;
    let err = hook.create_post(&form).await.unwrap_err();

    assert!(err.is_validation());
    assert!(app.gateway.calls().is_empty());
}

#[tokio::test]
async fn update_switching_to_text_clears_media() {
    let app = TestApp::signed_in("u-1");
    app.gateway.seed_record(POSTS_TABLE, &post("p-1", "c-1", PostType::Video, Visibility::All));
    let hook = CampaignPostsHook::new(&app.ctx, "c-1");
    hook.fetch().await.unwrap();
    assert!(hook.posts()[0].media_url.is_some());

    let mut form = PostForm::from_post(&hook.posts()[0]);
    form.post_type = PostType::Text;
    let updated = hook.update_post("p-1", form.to_patch().unwrap()).await.unwrap();

    assert_eq!(updated.post_type, PostType::Text);
    assert!(updated.media_url.is_none());
    assert_eq!(hook.posts()[0], updated);
}

#[tokio::test]
async fn delete_removes_post_and_failure_keeps_it() {
    let app = TestApp::signed_in("u-1");
    app.gateway.seed_record(POSTS_TABLE, &post("p-1", "c-1", PostType::Text, Visibility::All));
    app.gateway.seed_record(POSTS_TABLE, &post("p-2", "c-1", PostType::Text, Visibility::All));
    let hook = CampaignPostsHook::new(&app.ctx, "c-1");
    hook.fetch().await.unwrap();

    hook.delete_post("p-1").await.unwrap();
    assert_eq!(hook.posts().len(), 1);

    app.gateway.fail_on("delete", POSTS_TABLE);
    assert!(hook.delete_post("p-2").await.is_err());
    assert_eq!(hook.posts().len(), 1);
    assert_eq!(app.notifier.errors()[0].title, "Failed to delete post");
}

#[tokio::test(start_paused = true)]
async fn close_discards_in_flight_fetch() {
    let app = TestApp::signed_in("u-1");
    app.gateway.seed_record(POSTS_TABLE, &post("p-1", "c-1", PostType::Text, Visibility::All));
    app.gateway.set_delay(Duration::from_millis(200));
    let hook = CampaignPostsHook::new(&app.ctx, "c-1");

    let unmount = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        hook.close();
    };
    let (fetched, ()) = tokio::join!(hook.fetch(), unmount);

    assert!(fetched.is_ok());
    assert!(hook.posts().is_empty());
    assert!(!hook.is_loading());
    assert!(app.notifier.notices().is_empty());
}
