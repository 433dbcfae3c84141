use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use sea_orm::{
    sea_query::{Expr, Func, LikeExpr},
    ColumnTrait, Condition, ConnectionTrait, DbBackend, EntityTrait, JoinType, QueryFilter,
    QueryOrder, QuerySelect, RelationTrait, Select,
};

use super::{DbContext, Repository};
use crate::db::entities::{album, artist, genre, record_label, review, track, user};
use crate::error::Result;

/// An album with every related row loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumDetails {
    pub album: album::Model,
    pub artist: Option<artist::Model>,
    pub genre: Option<genre::Model>,
    pub record_label: Option<record_label::Model>,
    pub tracks: Vec<track::Model>,
    pub reviews: Vec<ReviewWithUser>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReviewWithUser {
    pub review: review::Model,
    pub user: Option<user::Model>,
}

pub struct AlbumRepository<'ctx> {
    context: &'ctx DbContext,
}

#[async_trait]
impl<'ctx> Repository<album::Entity> for AlbumRepository<'ctx> {
    fn context(&self) -> &DbContext {
        self.context
    }
}

impl<'ctx> AlbumRepository<'ctx> {
    pub fn new(context: &'ctx DbContext) -> Self {
        Self { context }
    }

    pub async fn get_with_details(&self, id: i32) -> Result<Option<AlbumDetails>> {
        let db = self.context.connection();
        let Some(album) = album::Entity::find_by_id(id).one(db).await? else {
            return Ok(None);
        };
        Ok(self.load_details(vec![album]).await?.pop())
    }

    pub async fn get_all_with_details(&self) -> Result<Vec<AlbumDetails>> {
        self.details_for(album::Entity::find().order_by_asc(album::Column::Id))
            .await
    }

    pub async fn get_by_artist(&self, artist_id: i32) -> Result<Vec<AlbumDetails>> {
        self.details_for(newest_first(
            album::Entity::find().filter(album::Column::ArtistId.eq(artist_id)),
        ))
        .await
    }

    pub async fn get_by_genre(&self, genre_id: i32) -> Result<Vec<AlbumDetails>> {
        self.details_for(newest_first(
            album::Entity::find().filter(album::Column::GenreId.eq(genre_id)),
        ))
        .await
    }

    pub async fn get_by_record_label(&self, record_label_id: i32) -> Result<Vec<AlbumDetails>> {
        self.details_for(newest_first(
            album::Entity::find().filter(album::Column::RecordLabelId.eq(record_label_id)),
        ))
        .await
    }

    /// Case-insensitive substring search over album title, linked artist name
    /// and album artist credit, newest first, one page at a time.
    ///
    /// The term matches literally; `%` and `_` are not wildcards. A blank term
    /// returns every album and ignores paging. A page that starts beyond what
    /// an SQL offset can express is empty.
    pub async fn search(
        &self,
        term: &str,
        page_number: u64,
        page_size: u64,
    ) -> Result<Vec<AlbumDetails>> {
        let backend = self.context.connection().get_database_backend();
        let term = fold_case(backend, term.trim());
        if term.is_empty() {
            return self.get_all_with_details().await;
        }

        let Some(offset) = page_offset(page_number, page_size) else {
            return Ok(Vec::new());
        };

        let pattern = format!("%{}%", escape_like(&term));
        let contains = || LikeExpr::new(pattern.as_str()).escape(LIKE_ESCAPE);
        let matches = Condition::any()
            .add(lower((album::Entity, album::Column::Title)).like(contains()))
            .add(lower((artist::Entity, artist::Column::Name)).like(contains()))
            .add(lower((album::Entity, album::Column::AlbumArtist)).like(contains()));

        let select = newest_first(
            album::Entity::find()
                .join(JoinType::LeftJoin, album::Relation::Artist.def())
                .filter(matches),
        )
        .offset(offset)
        .limit(page_size);

        self.details_for(select).await
    }

    async fn details_for(&self, select: Select<album::Entity>) -> Result<Vec<AlbumDetails>> {
        let albums = select.all(self.context.connection()).await?;
        self.load_details(albums).await
    }

    /// Batch-load the related rows of `albums`, one query per relation.
    async fn load_details(&self, albums: Vec<album::Model>) -> Result<Vec<AlbumDetails>> {
        if albums.is_empty() {
            return Ok(Vec::new());
        }
        let db = self.context.connection();

        let album_ids: Vec<i32> = albums.iter().map(|a| a.id).collect();
        let artist_ids = distinct(albums.iter().filter_map(|a| a.artist_id));
        let genre_ids = distinct(albums.iter().filter_map(|a| a.genre_id));
        let label_ids = distinct(albums.iter().filter_map(|a| a.record_label_id));

        let artists: HashMap<i32, artist::Model> = if artist_ids.is_empty() {
            HashMap::new()
        } else {
            artist::Entity::find()
                .filter(artist::Column::Id.is_in(artist_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|a| (a.id, a))
                .collect()
        };

        let genres: HashMap<i32, genre::Model> = if genre_ids.is_empty() {
            HashMap::new()
        } else {
            genre::Entity::find()
                .filter(genre::Column::Id.is_in(genre_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|g| (g.id, g))
                .collect()
        };

        let labels: HashMap<i32, record_label::Model> = if label_ids.is_empty() {
            HashMap::new()
        } else {
            record_label::Entity::find()
                .filter(record_label::Column::Id.is_in(label_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|l| (l.id, l))
                .collect()
        };

        let mut tracks: HashMap<i32, Vec<track::Model>> = HashMap::new();
        for t in track::Entity::find()
            .filter(track::Column::AlbumId.is_in(album_ids.clone()))
            .order_by_asc(track::Column::TrackNumber)
            .order_by_asc(track::Column::Id)
            .all(db)
            .await?
        {
            tracks.entry(t.album_id).or_default().push(t);
        }

        let reviews = review::Entity::find()
            .filter(review::Column::AlbumId.is_in(album_ids))
            .order_by_asc(review::Column::Id)
            .all(db)
            .await?;

        let user_ids: BTreeSet<String> = reviews.iter().map(|r| r.user_id.clone()).collect();
        let users: HashMap<String, user::Model> = if user_ids.is_empty() {
            HashMap::new()
        } else {
            user::Entity::find()
                .filter(user::Column::Id.is_in(user_ids))
                .all(db)
                .await?
                .into_iter()
                .map(|u| (u.id.clone(), u))
                .collect()
        };

        let mut reviews_by_album: HashMap<i32, Vec<ReviewWithUser>> = HashMap::new();
        for review in reviews {
            let user = users.get(&review.user_id).cloned();
            reviews_by_album
                .entry(review.album_id)
                .or_default()
                .push(ReviewWithUser { review, user });
        }

        Ok(albums
            .into_iter()
            .map(|album| AlbumDetails {
                artist: album.artist_id.and_then(|id| artists.get(&id).cloned()),
                genre: album.genre_id.and_then(|id| genres.get(&id).cloned()),
                record_label: album.record_label_id.and_then(|id| labels.get(&id).cloned()),
                tracks: tracks.remove(&album.id).unwrap_or_default(),
                reviews: reviews_by_album.remove(&album.id).unwrap_or_default(),
                album,
            })
            .collect())
    }
}

fn newest_first(select: Select<album::Entity>) -> Select<album::Entity> {
    select
        .order_by_desc(album::Column::ReleaseDate)
        .order_by_asc(album::Column::Id)
}

/// `LOWER()` folds every character on Postgres but only ASCII on SQLite.
fn lower<C: sea_orm::sea_query::IntoColumnRef>(column: C) -> Expr {
    Expr::expr(Func::lower(Expr::col(column)))
}

/// Fold a search term the same way the backend's `LOWER()` folds columns, so
/// non-ASCII letters still match themselves on SQLite.
fn fold_case(backend: DbBackend, term: &str) -> String {
    match backend {
        DbBackend::Sqlite => term.to_ascii_lowercase(),
        _ => term.to_lowercase(),
    }
}

const LIKE_ESCAPE: char = '\\';

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

/// Rows to skip before a 1-indexed page, if it fits a signed 64-bit OFFSET.
fn page_offset(page_number: u64, page_size: u64) -> Option<u64> {
    page_number
        .saturating_sub(1)
        .checked_mul(page_size)
        .filter(|&offset| offset <= i64::MAX as u64)
}

fn distinct(ids: impl Iterator<Item = i32>) -> BTreeSet<i32> {
    ids.collect()
}
