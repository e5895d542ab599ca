//! SQL schema for the podhub SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    verified      INTEGER NOT NULL DEFAULT 0,
    bio           TEXT,
    image         BLOB,
    created_at    TEXT NOT NULL
);

-- Only the SHA-256 of the bearer token is stored.
CREATE TABLE IF NOT EXISTS sessions (
    token_hash TEXT PRIMARY KEY,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS podcasts (
    podcast_id  TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE,
    summary     TEXT NOT NULL,
    description TEXT NOT NULL,
    author_id   TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    category    TEXT,            -- display title of Category or NULL
    cover       BLOB NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS episodes (
    episode_id  TEXT PRIMARY KEY,
    podcast_id  TEXT NOT NULL REFERENCES podcasts(podcast_id) ON DELETE CASCADE,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    tags        TEXT NOT NULL DEFAULT '[]',   -- JSON array of strings
    audio       BLOB NOT NULL,
    created_at  TEXT NOT NULL,
    UNIQUE (podcast_id, title)
);

-- Where each user stopped listening to each episode.
CREATE TABLE IF NOT EXISTS playback (
    user_id     TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    episode_id  TEXT NOT NULL REFERENCES episodes(episode_id) ON DELETE CASCADE,
    current_sec INTEGER NOT NULL,
    updated_at  TEXT NOT NULL,
    PRIMARY KEY (user_id, episode_id)
);

CREATE TABLE IF NOT EXISTS comments (
    comment_id TEXT PRIMARY KEY,
    episode_id TEXT NOT NULL REFERENCES episodes(episode_id) ON DELETE CASCADE,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS replies (
    reply_id   TEXT PRIMARY KEY,
    comment_id TEXT NOT NULL REFERENCES comments(comment_id) ON DELETE CASCADE,
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    content    TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS favorites (
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    podcast_id TEXT NOT NULL REFERENCES podcasts(podcast_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, podcast_id)
);

CREATE TABLE IF NOT EXISTS stream_later (
    user_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    episode_id TEXT NOT NULL REFERENCES episodes(episode_id) ON DELETE CASCADE,
    created_at TEXT NOT NULL,
    PRIMARY KEY (user_id, episode_id)
);

CREATE TABLE IF NOT EXISTS follows (
    follower_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    followed_id TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    created_at  TEXT NOT NULL,
    PRIMARY KEY (follower_id, followed_id)
);

-- Written in batches by the notifier; never updated, only bulk-cleared.
CREATE TABLE IF NOT EXISTS notifications (
    notification_id TEXT PRIMARY KEY,
    recipient_id    TEXT NOT NULL REFERENCES users(user_id) ON DELETE CASCADE,
    kind            TEXT NOT NULL,   -- 'new_podcast' | 'new_episode'
    object_json     TEXT NOT NULL,   -- snapshot of the triggering entity
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS podcasts_author_idx        ON podcasts(author_id);
CREATE INDEX IF NOT EXISTS podcasts_category_idx      ON podcasts(category);
CREATE INDEX IF NOT EXISTS episodes_podcast_idx       ON episodes(podcast_id);
CREATE INDEX IF NOT EXISTS comments_episode_idx       ON comments(episode_id);
CREATE INDEX IF NOT EXISTS replies_comment_idx        ON replies(comment_id);
CREATE INDEX IF NOT EXISTS follows_followed_idx       ON follows(followed_id);
CREATE INDEX IF NOT EXISTS notifications_recipient_idx ON notifications(recipient_id);

PRAGMA user_version = 1;
";
