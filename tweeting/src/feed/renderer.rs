//! Feed renderer
//!
//! Renders the feed screen to plain text for the terminal session.

use chrono::{DateTime, Utc};

use crate::app::{PostCard, ScreenView, SyncPhase, Theme};

const BODY_WIDTH: usize = 280;

struct Palette {
    rule: &'static str,
    liked: &'static str,
    unliked: &'static str,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Light => Palette {
            rule: "----------------------------------------",
            liked: "<3",
            unliked: "</3",
        },
        Theme::Dark => Palette {
            rule: "========================================",
            liked: "(*)",
            unliked: "( )",
        },
    }
}

/// Render the whole screen
pub fn render_screen(view: &ScreenView, now: DateTime<Utc>) -> String {
    let palette = palette(view.theme);
    let mut buf = String::new();

    buf.push_str(palette.rule);
    buf.push('\n');
    buf.push_str(&format!("Tweeting App [{}]\n", view.theme));
    buf.push_str(palette.rule);
    buf.push('\n');

    match view.phase {
        SyncPhase::Uninitialized => buf.push_str("_Connecting..._\n"),
        SyncPhase::Unsubscribed => buf.push_str("_Feed closed._\n"),
        SyncPhase::Subscribed if view.posts.is_empty() => {
            buf.push_str("_No tweets yet. Be the first!_\n")
        }
        SyncPhase::Subscribed => {
            for (i, card) in view.posts.iter().enumerate() {
                buf.push_str(&render_card(i + 1, card, &palette, now));
            }
        }
    }

    buf.push_str(palette.rule);
    buf.push('\n');
    buf.push_str(&format!("Name: {}\n", field_or_placeholder(&view.author_input, "Enter your name")));
    buf.push_str(&format!(
        "Message: {}\n",
        field_or_placeholder(&view.body_input, "What's happening? ;)")
    ));

    buf
}

fn render_card(position: usize, card: &PostCard, palette: &Palette, now: DateTime<Utc>) -> String {
    let marker = if card.liked {
        palette.liked
    } else {
        palette.unliked
    };

    format!(
        "[{}] {} · {}\n    {}\n    {} {}\n",
        position,
        card.author,
        relative_time(card.created_at, now),
        truncate(&card.body, BODY_WIDTH),
        marker,
        like_label(card.like_count)
    )
}

fn like_label(count: i64) -> String {
    if count == 1 {
        "1 Like".to_string()
    } else {
        format!("{} Likes", count)
    }
}

fn field_or_placeholder(value: &str, placeholder: &str) -> String {
    if value.is_empty() {
        format!("({})", placeholder)
    } else {
        value.to_string()
    }
}

/// Age of a post in the coarsest sensible unit
pub fn relative_time(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(created_at);

    if age.num_minutes() < 1 {
        "just now".to_string()
    } else if age.num_hours() < 1 {
        format!("{}m ago", age.num_minutes())
    } else if age.num_days() < 1 {
        format!("{}h ago", age.num_hours())
    } else if age.num_days() < 7 {
        format!("{}d ago", age.num_days())
    } else {
        created_at.format("%b %-d, %Y").to_string()
    }
}

/// Truncate a string with ellipsis
fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    use crate::domain::entities::PostId;

    fn card(id: &str, like_count: i64, liked: bool, created_at: DateTime<Utc>) -> PostCard {
        PostCard {
            id: PostId::from(id),
            author: "alice".to_string(),
            body: format!("post {}", id),
            created_at,
            like_count,
            liked,
        }
    }

    fn view(posts: Vec<PostCard>, theme: Theme) -> ScreenView {
        ScreenView {
            posts,
            theme,
            author_input: "alice".to_string(),
            body_input: String::new(),
            phase: SyncPhase::Subscribed,
        }
    }

    #[test]
    fn renders_posts_with_positions_and_likes() {
        let now = Utc::now();
        let out = render_screen(
            &view(
                vec![
                    card("b", 1, true, now - Duration::minutes(5)),
                    card("a", 2, false, now - Duration::hours(3)),
                ],
                Theme::Light,
            ),
            now,
        );

        assert!(out.contains("Tweeting App [light]"));
        assert!(out.contains("[1] alice · 5m ago\n    post b\n    <3 1 Like"));
        assert!(out.contains("[2] alice · 3h ago\n    post a\n    </3 2 Likes"));
        assert!(out.find("post b").unwrap() < out.find("post a").unwrap());
        assert!(out.contains("Name: alice"));
        assert!(out.contains("Message: (What's happening? ;))"));
    }

    #[test]
    fn dark_theme_changes_markers() {
        let now = Utc::now();
        let out = render_screen(&view(vec![card("a", 0, true, now)], Theme::Dark), now);

        assert!(out.contains("Tweeting App [dark]"));
        assert!(out.contains("(*) 0 Likes"));
        assert!(out.starts_with("===="));
    }

    #[test]
    fn empty_feed_and_phases() {
        let now = Utc::now();
        let mut v = view(vec![], Theme::Light);
        assert!(render_screen(&v, now).contains("No tweets yet"));

        v.phase = SyncPhase::Uninitialized;
        assert!(render_screen(&v, now).contains("Connecting"));

        v.phase = SyncPhase::Unsubscribed;
        assert!(render_screen(&v, now).contains("Feed closed"));
    }

    #[test]
    fn relative_time_units() {
        let now = DateTime::from_timestamp(1_700_000_000, 0).unwrap();

        assert_eq!(relative_time(now - Duration::seconds(30), now), "just now");
        assert_eq!(relative_time(now - Duration::minutes(59), now), "59m ago");
        assert_eq!(relative_time(now - Duration::hours(2), now), "2h ago");
        assert_eq!(relative_time(now - Duration::days(6), now), "6d ago");
        assert_eq!(relative_time(now - Duration::days(30), now), "Oct 15, 2023");
    }

    #[test]
    fn future_timestamps_read_as_just_now() {
        let now = Utc::now();
        assert_eq!(relative_time(now + Duration::minutes(3), now), "just now");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("héllo wörld", 8), "héllo...");
        assert_eq!(truncate("short", 8), "short");
    }
}
