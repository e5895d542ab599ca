//! [`SqliteStore`], the SQLite implementation of [`PodcastStore`].

use std::{collections::HashMap, path::Path};

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, params, params_from_iter, types::Value};
use uuid::Uuid;

use podhub_core::{
  notification::Notification,
  podcast::{
    Episode, EpisodePatch, NewEpisode, NewPodcast, Podcast, PodcastPatch,
    PopularPodcast,
  },
  social::{Comment, Follow, NewComment, NewReply, Reply},
  store::{PodcastQuery, PodcastStore},
  user::{NewUser, Session, User, UserRef},
};

use crate::{
  Error, Result,
  encode::{
    COMMENT_COLUMNS, EPISODE_COLUMNS, PODCAST_COLUMNS, REPLY_COLUMNS,
    RawComment, RawEpisode, RawNotification, RawPodcast, RawReply, RawUser,
    USER_COLUMNS, decode_uuid, encode_category, encode_dt, encode_tags,
    encode_uuid,
  },
  error::write_error,
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A podhub store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn query_podcasts(&self, sql: String, args: Vec<Value>) -> Result<Vec<Podcast>> {
    let raws: Vec<RawPodcast> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(args), RawPodcast::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPodcast::into_podcast).collect()
  }

  async fn query_episodes(&self, sql: String, args: Vec<Value>) -> Result<Vec<Episode>> {
    let raws: Vec<RawEpisode> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params_from_iter(args), RawEpisode::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEpisode::into_episode).collect()
  }

  /// Read a single BLOB column; `None` when the row is missing or NULL.
  async fn query_blob(&self, sql: &'static str, id: Uuid) -> Result<Option<Vec<u8>>> {
    let id_str = encode_uuid(id);
    let blob: Option<Option<Vec<u8>>> = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(sql, params![id_str], |row| row.get(0)).optional()?)
      })
      .await?;
    Ok(blob.flatten())
  }

  /// Run a `DELETE`; returns whether any row was removed.
  async fn delete_where(&self, sql: &'static str, ids: Vec<String>) -> Result<bool> {
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute(sql, params_from_iter(ids))?))
      .await?;
    Ok(removed > 0)
  }

  /// Replies selected by `sql` with `id` bound to `?1`.
  async fn replies_for(&self, sql: String, id: Uuid) -> Result<Vec<Reply>> {
    let id_str = encode_uuid(id);
    let raws: Vec<RawReply> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(params![id_str], RawReply::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawReply::into_reply).collect()
  }
}

fn podcast_select(where_clause: &str) -> String {
  format!(
    "SELECT {PODCAST_COLUMNS}
     FROM podcasts p
     JOIN users u ON u.user_id = p.author_id
     {where_clause}"
  )
}

fn user_conflict(msg: &str) -> String {
  if msg.contains("users.email") {
    "email already registered".into()
  } else {
    "username already taken".into()
  }
}

// ─── PodcastStore impl ───────────────────────────────────────────────────────

impl PodcastStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn create_user(&self, input: NewUser) -> Result<User> {
    let user = User {
      user_id:       Uuid::new_v4(),
      email:         input.email,
      username:      input.username,
      password_hash: input.password_hash,
      verified:      false,
      bio:           None,
      created_at:    Utc::now(),
    };

    let id_str   = encode_uuid(user.user_id);
    let email    = user.email.clone();
    let username = user.username.clone();
    let hash     = user.password_hash.clone();
    let at_str   = encode_dt(user.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO users (user_id, email, username, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![id_str, email, username, hash, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| write_error(e, user_conflict, "user"))?;

    tracing::debug!(user_id = %user.user_id, "user created");
    Ok(user)
  }

  async fn get_user(&self, id: Uuid) -> Result<Option<User>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.user_id = ?1"),
              params![id_str],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn get_user_by_email(&self, email: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users u WHERE u.email = ?1"),
              params![email],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self) -> Result<Vec<User>> {
    let raws: Vec<RawUser> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users u ORDER BY u.created_at, u.rowid"
        ))?;
        let rows = stmt
          .query_map([], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn set_bio(&self, id: Uuid, bio: Option<String>) -> Result<()> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("UPDATE users SET bio = ?2 WHERE user_id = ?1", params![
          id_str, bio
        ])?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::UserNotFound(id));
    }
    Ok(())
  }

  async fn set_user_image(&self, id: Uuid, image: Vec<u8>) -> Result<()> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("UPDATE users SET image = ?2 WHERE user_id = ?1", params![
          id_str, image
        ])?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::UserNotFound(id));
    }
    Ok(())
  }

  async fn user_image(&self, id: Uuid) -> Result<Option<Vec<u8>>> {
    self.query_blob("SELECT image FROM users WHERE user_id = ?1", id).await
  }

  async fn is_author(&self, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(
            "SELECT EXISTS (SELECT 1 FROM podcasts WHERE author_id = ?1)",
            params![id_str],
            |row| row.get::<_, bool>(0),
          )?)
        })
        .await?,
    )
  }

  // ── Sessions ──────────────────────────────────────────────────────────────

  async fn create_session(&self, session: Session) -> Result<()> {
    let user_str    = encode_uuid(session.user_id);
    let created_str = encode_dt(session.created_at);
    let expires_str = encode_dt(session.expires_at);
    let token_hash  = session.token_hash;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
           VALUES (?1, ?2, ?3, ?4)",
          params![token_hash, user_str, created_str, expires_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| write_error(e, |_| "session already exists".into(), "user"))
  }

  async fn session_user(
    &self,
    token_hash: String,
    now: DateTime<Utc>,
  ) -> Result<Option<Uuid>> {
    let now_str = encode_dt(now);
    let user: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id FROM sessions WHERE token_hash = ?1 AND expires_at > ?2",
              params![token_hash, now_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    user.as_deref().map(decode_uuid).transpose()
  }

  async fn delete_session(&self, token_hash: String) -> Result<bool> {
    self
      .delete_where("DELETE FROM sessions WHERE token_hash = ?1", vec![token_hash])
      .await
  }

  // ── Podcasts ──────────────────────────────────────────────────────────────

  async fn create_podcast(&self, input: NewPodcast) -> Result<Podcast> {
    let podcast_id = Uuid::new_v4();

    let id_str      = encode_uuid(podcast_id);
    let author_str  = encode_uuid(input.author_id);
    let category    = encode_category(input.category);
    let at_str      = encode_dt(Utc::now());
    let NewPodcast { name, summary, description, cover, .. } = input;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO podcasts (
             podcast_id, name, summary, description, author_id, category, cover, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          params![id_str, name, summary, description, author_str, category, cover, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| write_error(e, |_| "podcast name already exists".into(), "user"))?;

    tracing::debug!(%podcast_id, "podcast created");
    self.get_podcast(podcast_id).await?.ok_or(Error::PodcastNotFound(podcast_id))
  }

  async fn get_podcast(&self, id: Uuid) -> Result<Option<Podcast>> {
    let mut found = self
      .query_podcasts(podcast_select("WHERE p.podcast_id = ?1"), vec![
        encode_uuid(id).into(),
      ])
      .await?;
    Ok(found.pop())
  }

  async fn list_podcasts(&self, query: PodcastQuery) -> Result<Vec<Podcast>> {
    // A negative LIMIT means "no limit" to SQLite.
    let limit = query.limit.map_or(-1, |l| l as i64);
    let offset = query.offset.unwrap_or(0) as i64;

    self
      .query_podcasts(
        podcast_select(
          "WHERE (?1 IS NULL OR p.author_id = ?1)
             AND (?2 IS NULL OR p.category = ?2)
           ORDER BY p.created_at, p.rowid
           LIMIT ?3 OFFSET ?4",
        ),
        vec![
          query.author_id.map(encode_uuid).into(),
          encode_category(query.category).into(),
          limit.into(),
          offset.into(),
        ],
      )
      .await
  }

  async fn podcast_cover(&self, id: Uuid) -> Result<Option<Vec<u8>>> {
    self.query_blob("SELECT cover FROM podcasts WHERE podcast_id = ?1", id).await
  }

  async fn update_podcast(&self, id: Uuid, patch: PodcastPatch) -> Result<Podcast> {
    let id_str   = encode_uuid(id);
    let category = encode_category(patch.category);
    let PodcastPatch { name, summary, description, cover, .. } = patch;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE podcasts SET
             name        = COALESCE(?2, name),
             summary     = COALESCE(?3, summary),
             description = COALESCE(?4, description),
             category    = COALESCE(?5, category),
             cover       = COALESCE(?6, cover)
           WHERE podcast_id = ?1",
          params![id_str, name, summary, description, category, cover],
        )?)
      })
      .await
      .map_err(|e| write_error(e, |_| "podcast name already exists".into(), "podcast"))?;

    if changed == 0 {
      return Err(Error::PodcastNotFound(id));
    }
    self.get_podcast(id).await?.ok_or(Error::PodcastNotFound(id))
  }

  async fn delete_podcast(&self, id: Uuid) -> Result<bool> {
    self
      .delete_where("DELETE FROM podcasts WHERE podcast_id = ?1", vec![encode_uuid(id)])
      .await
  }

  async fn popular_podcasts(&self, limit: usize) -> Result<Vec<PopularPodcast>> {
    let limit = limit as i64;
    let raws: Vec<(RawPodcast, i64)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PODCAST_COLUMNS}, COUNT(*) AS views
           FROM podcasts p
           JOIN users    u  ON u.user_id     = p.author_id
           JOIN episodes e  ON e.podcast_id  = p.podcast_id
           JOIN playback pb ON pb.episode_id = e.episode_id
           GROUP BY p.podcast_id
           ORDER BY views DESC, p.created_at, p.rowid
           LIMIT ?1"
        ))?;
        let rows = stmt
          .query_map(params![limit], |row| Ok((RawPodcast::from_row(row)?, row.get(8)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(|(raw, views)| -> Result<PopularPodcast> {
        Ok(PopularPodcast { podcast: raw.into_podcast()?, views: views as u64 })
      })
      .collect()
  }

  // ── Episodes ──────────────────────────────────────────────────────────────

  async fn create_episode(&self, input: NewEpisode) -> Result<Episode> {
    let episode = Episode {
      episode_id:  Uuid::new_v4(),
      podcast_id:  input.podcast_id,
      title:       input.title,
      description: input.description,
      tags:        input.tags,
      created_at:  Utc::now(),
    };

    let id_str      = encode_uuid(episode.episode_id);
    let podcast_str = encode_uuid(episode.podcast_id);
    let title       = episode.title.clone();
    let description = episode.description.clone();
    let tags_str    = encode_tags(&episode.tags)?;
    let at_str      = encode_dt(episode.created_at);
    let audio       = input.audio;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO episodes (
             episode_id, podcast_id, title, description, tags, audio, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          params![id_str, podcast_str, title, description, tags_str, audio, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| {
        write_error(e, |_| "episode title already exists in this podcast".into(), "podcast")
      })?;

    tracing::debug!(episode_id = %episode.episode_id, "episode created");
    Ok(episode)
  }

  async fn get_episode(&self, id: Uuid) -> Result<Option<Episode>> {
    let mut found = self
      .query_episodes(
        format!("SELECT {EPISODE_COLUMNS} FROM episodes e WHERE e.episode_id = ?1"),
        vec![encode_uuid(id).into()],
      )
      .await?;
    Ok(found.pop())
  }

  async fn list_episodes(&self, podcast_id: Uuid) -> Result<Vec<Episode>> {
    self
      .query_episodes(
        format!(
          "SELECT {EPISODE_COLUMNS} FROM episodes e
           WHERE e.podcast_id = ?1
           ORDER BY e.created_at, e.rowid"
        ),
        vec![encode_uuid(podcast_id).into()],
      )
      .await
  }

  async fn episode_audio(&self, id: Uuid) -> Result<Option<Vec<u8>>> {
    self.query_blob("SELECT audio FROM episodes WHERE episode_id = ?1", id).await
  }

  async fn update_episode(&self, id: Uuid, patch: EpisodePatch) -> Result<Episode> {
    let id_str   = encode_uuid(id);
    let tags_str = patch.tags.as_deref().map(encode_tags).transpose()?;
    let EpisodePatch { title, description, audio, .. } = patch;

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE episodes SET
             title       = COALESCE(?2, title),
             description = COALESCE(?3, description),
             tags        = COALESCE(?4, tags),
             audio       = COALESCE(?5, audio)
           WHERE episode_id = ?1",
          params![id_str, title, description, tags_str, audio],
        )?)
      })
      .await
      .map_err(|e| {
        write_error(e, |_| "episode title already exists in this podcast".into(), "episode")
      })?;

    if changed == 0 {
      return Err(Error::EpisodeNotFound(id));
    }
    self.get_episode(id).await?.ok_or(Error::EpisodeNotFound(id))
  }

  async fn delete_episode(&self, id: Uuid) -> Result<bool> {
    self
      .delete_where("DELETE FROM episodes WHERE episode_id = ?1", vec![encode_uuid(id)])
      .await
  }

  // ── Playback position ─────────────────────────────────────────────────────

  async fn set_playback(
    &self,
    user_id: Uuid,
    episode_id: Uuid,
    current_sec: u32,
  ) -> Result<bool> {
    let user_str    = encode_uuid(user_id);
    let episode_str = encode_uuid(episode_id);
    let at_str      = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let existed = tx
          .query_row(
            "SELECT 1 FROM playback WHERE user_id = ?1 AND episode_id = ?2",
            params![user_str, episode_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        tx.execute(
          "INSERT INTO playback (user_id, episode_id, current_sec, updated_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (user_id, episode_id) DO UPDATE SET
             current_sec = excluded.current_sec,
             updated_at  = excluded.updated_at",
          params![user_str, episode_str, current_sec, at_str],
        )?;
        tx.commit()?;
        Ok(!existed)
      })
      .await
      .map_err(|e| write_error(e, |_| String::new(), "episode"))
  }

  async fn get_playback(&self, user_id: Uuid, episode_id: Uuid) -> Result<Option<u32>> {
    let user_str    = encode_uuid(user_id);
    let episode_str = encode_uuid(episode_id);
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(
            conn
              .query_row(
                "SELECT current_sec FROM playback WHERE user_id = ?1 AND episode_id = ?2",
                params![user_str, episode_str],
                |row| row.get(0),
              )
              .optional()?,
          )
        })
        .await?,
    )
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn add_comment(&self, input: NewComment) -> Result<Comment> {
    let comment_id  = Uuid::new_v4();
    let id_str      = encode_uuid(comment_id);
    let episode_str = encode_uuid(input.episode_id);
    let user_str    = encode_uuid(input.user_id);
    let at_str      = encode_dt(Utc::now());
    let content     = input.content;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO comments (comment_id, episode_id, user_id, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![id_str, episode_str, user_str, content, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| write_error(e, |_| "comment already exists".into(), "episode"))?;

    self.get_comment(comment_id).await?.ok_or(Error::MissingReference("comment"))
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);
    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {COMMENT_COLUMNS}
                 FROM comments c JOIN users u ON u.user_id = c.user_id
                 WHERE c.comment_id = ?1"
              ),
              params![id_str],
              RawComment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    let Some(raw) = raw else { return Ok(None) };
    let mut comment = raw.into_comment()?;
    comment.replies = self
      .replies_for(
        format!(
          "SELECT {REPLY_COLUMNS}
           FROM replies r JOIN users u ON u.user_id = r.user_id
           WHERE r.comment_id = ?1
           ORDER BY r.created_at, r.rowid"
        ),
        id,
      )
      .await?;
    Ok(Some(comment))
  }

  async fn list_comments(&self, episode_id: Uuid) -> Result<Vec<Comment>> {
    let episode_str = encode_uuid(episode_id);
    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS}
           FROM comments c JOIN users u ON u.user_id = c.user_id
           WHERE c.episode_id = ?1
           ORDER BY c.created_at, c.rowid"
        ))?;
        let rows = stmt
          .query_map(params![episode_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut comments: Vec<Comment> =
      raws.into_iter().map(RawComment::into_comment).collect::<Result<_>>()?;
    if comments.is_empty() {
      return Ok(comments);
    }

    let replies = self
      .replies_for(
        format!(
          "SELECT {REPLY_COLUMNS}
           FROM replies r
           JOIN users    u ON u.user_id    = r.user_id
           JOIN comments c ON c.comment_id = r.comment_id
           WHERE c.episode_id = ?1
           ORDER BY r.created_at, r.rowid"
        ),
        episode_id,
      )
      .await?;

    let index: HashMap<Uuid, usize> = comments
      .iter()
      .enumerate()
      .map(|(i, c)| (c.comment_id, i))
      .collect();
    for reply in replies {
      if let Some(&i) = index.get(&reply.comment_id) {
        comments[i].replies.push(reply);
      }
    }
    Ok(comments)
  }

  async fn delete_comment(&self, id: Uuid) -> Result<bool> {
    self
      .delete_where("DELETE FROM comments WHERE comment_id = ?1", vec![encode_uuid(id)])
      .await
  }

  async fn add_reply(&self, input: NewReply) -> Result<Reply> {
    let reply_id    = Uuid::new_v4();
    let id_str      = encode_uuid(reply_id);
    let comment_str = encode_uuid(input.comment_id);
    let user_str    = encode_uuid(input.user_id);
    let at_str      = encode_dt(Utc::now());
    let content     = input.content;

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO replies (reply_id, comment_id, user_id, content, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          params![id_str, comment_str, user_str, content, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| write_error(e, |_| "reply already exists".into(), "comment"))?;

    self.get_reply(reply_id).await?.ok_or(Error::MissingReference("reply"))
  }

  async fn get_reply(&self, id: Uuid) -> Result<Option<Reply>> {
    let mut found = self
      .replies_for(
        format!(
          "SELECT {REPLY_COLUMNS}
           FROM replies r JOIN users u ON u.user_id = r.user_id
           WHERE r.reply_id = ?1"
        ),
        id,
      )
      .await?;
    Ok(found.pop())
  }

  async fn delete_reply(&self, id: Uuid) -> Result<bool> {
    self
      .delete_where("DELETE FROM replies WHERE reply_id = ?1", vec![encode_uuid(id)])
      .await
  }

  // ── Favorites ─────────────────────────────────────────────────────────────

  async fn add_favorite(&self, user_id: Uuid, podcast_id: Uuid) -> Result<()> {
    let user_str    = encode_uuid(user_id);
    let podcast_str = encode_uuid(podcast_id);
    let at_str      = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO favorites (user_id, podcast_id, created_at) VALUES (?1, ?2, ?3)",
          params![user_str, podcast_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| write_error(e, |_| "podcast already in favorites".into(), "podcast"))
  }

  async fn remove_favorite(&self, user_id: Uuid, podcast_id: Uuid) -> Result<bool> {
    self
      .delete_where(
        "DELETE FROM favorites WHERE user_id = ?1 AND podcast_id = ?2",
        vec![encode_uuid(user_id), encode_uuid(podcast_id)],
      )
      .await
  }

  async fn list_favorites(&self, user_id: Uuid) -> Result<Vec<Podcast>> {
    self
      .query_podcasts(
        podcast_select(
          "JOIN favorites f ON f.podcast_id = p.podcast_id
           WHERE f.user_id = ?1
           ORDER BY f.created_at, f.rowid",
        ),
        vec![encode_uuid(user_id).into()],
      )
      .await
  }

  // ── Listen later ──────────────────────────────────────────────────────────

  async fn add_stream_later(&self, user_id: Uuid, episode_id: Uuid) -> Result<()> {
    let user_str    = encode_uuid(user_id);
    let episode_str = encode_uuid(episode_id);
    let at_str      = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO stream_later (user_id, episode_id, created_at) VALUES (?1, ?2, ?3)",
          params![user_str, episode_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| write_error(e, |_| "episode already in listen later".into(), "episode"))
  }

  async fn remove_stream_later(&self, user_id: Uuid, episode_id: Uuid) -> Result<bool> {
    self
      .delete_where(
        "DELETE FROM stream_later WHERE user_id = ?1 AND episode_id = ?2",
        vec![encode_uuid(user_id), encode_uuid(episode_id)],
      )
      .await
  }

  async fn list_stream_later(&self, user_id: Uuid) -> Result<Vec<Episode>> {
    self
      .query_episodes(
        format!(
          "SELECT {EPISODE_COLUMNS}
           FROM episodes e
           JOIN stream_later s ON s.episode_id = e.episode_id
           WHERE s.user_id = ?1
           ORDER BY s.created_at, s.rowid"
        ),
        vec![encode_uuid(user_id).into()],
      )
      .await
  }

  async fn in_stream_later(&self, user_id: Uuid, episode_id: Uuid) -> Result<bool> {
    let user_str    = encode_uuid(user_id);
    let episode_str = encode_uuid(episode_id);
    Ok(
      self
        .conn
        .call(move |conn| {
          Ok(conn.query_row(
            "SELECT EXISTS (
               SELECT 1 FROM stream_later WHERE user_id = ?1 AND episode_id = ?2
             )",
            params![user_str, episode_str],
            |row| row.get::<_, bool>(0),
          )?)
        })
        .await?,
    )
  }

  // ── Follows ───────────────────────────────────────────────────────────────

  async fn follow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<Follow> {
    let follow = Follow { follower_id, followed_id, created_at: Utc::now() };

    let follower_str = encode_uuid(follower_id);
    let followed_str = encode_uuid(followed_id);
    let at_str       = encode_dt(follow.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO follows (follower_id, followed_id, created_at) VALUES (?1, ?2, ?3)",
          params![follower_str, followed_str, at_str],
        )?;
        Ok(())
      })
      .await
      .map_err(|e| write_error(e, |_| "already following this user".into(), "user"))?;

    Ok(follow)
  }

  async fn unfollow(&self, follower_id: Uuid, followed_id: Uuid) -> Result<bool> {
    self
      .delete_where(
        "DELETE FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
        vec![encode_uuid(follower_id), encode_uuid(followed_id)],
      )
      .await
  }

  async fn list_following(&self, user_id: Uuid) -> Result<Vec<UserRef>> {
    let user_str = encode_uuid(user_id);
    let rows: Vec<(String, String)> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT u.user_id, u.username
           FROM follows f JOIN users u ON u.user_id = f.followed_id
           WHERE f.follower_id = ?1
           ORDER BY f.created_at, f.rowid",
        )?;
        let rows = stmt
          .query_map(params![user_str], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(|(id, username)| -> Result<UserRef> {
        Ok(UserRef { id: decode_uuid(&id)?, username })
      })
      .collect()
  }

  async fn followers_of(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
    let user_str = encode_uuid(user_id);
    let ids: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT follower_id FROM follows WHERE followed_id = ?1
           ORDER BY created_at, rowid",
        )?;
        let rows = stmt
          .query_map(params![user_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    ids.iter().map(|s| decode_uuid(s)).collect()
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn insert_notifications(&self, batch: Vec<Notification>) -> Result<usize> {
    let rows: Vec<(String, String, String, String, String)> = batch
      .iter()
      .map(|n| -> Result<_> {
        Ok((
          encode_uuid(n.notification_id),
          encode_uuid(n.recipient_id),
          n.payload.kind().as_ref().to_owned(),
          n.payload.to_json()?.to_string(),
          encode_dt(n.created_at),
        ))
      })
      .collect::<Result<_>>()?;

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO notifications (
               notification_id, recipient_id, kind, object_json, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (id, recipient, kind, object, at) in &rows {
            stmt.execute(params![id, recipient, kind, object, at])?;
          }
        }
        tx.commit()?;
        Ok(rows.len())
      })
      .await
      .map_err(|e| write_error(e, |_| "duplicate notification id".into(), "user"))
  }

  async fn list_notifications(&self, user_id: Uuid) -> Result<Vec<Notification>> {
    let user_str = encode_uuid(user_id);
    let raws: Vec<RawNotification> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT notification_id, recipient_id, kind, object_json, created_at
           FROM notifications
           WHERE recipient_id = ?1
           ORDER BY created_at DESC, rowid DESC",
        )?;
        let rows = stmt
          .query_map(params![user_str], RawNotification::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawNotification::into_notification).collect()
  }

  async fn clear_notifications(&self, user_id: Uuid) -> Result<usize> {
    let user_str = encode_uuid(user_id);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM notifications WHERE recipient_id = ?1", params![
          user_str
        ])?)
      })
      .await?;

    tracing::debug!(%user_id, removed, "notifications cleared");
    Ok(removed)
  }
}
