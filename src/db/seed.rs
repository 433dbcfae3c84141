//! Development data bootstrapper.
//!
//! Fills an empty catalog with a handful of genres, labels, artists, albums
//! with tracks, two users and their reviews. Every group is committed through
//! its own [`UnitOfWork::save_changes`] so later groups can reference the ids
//! generated for earlier ones.

use std::collections::HashMap;

use chrono::{Duration, NaiveDate, Utc};
use rand::Rng;
use sea_orm::{ActiveValue::NotSet, DatabaseConnection, Set};
use tracing::info;
use uuid::Uuid;

use crate::db::entities::{album, artist, genre, record_label, review, track, user};
use crate::db::repositories::{Repository, UnitOfWork};
use crate::error::{AppError, Result};
use crate::services::PasswordCredentials;

const GENRES: &[(&str, &str)] = &[
    ("Rock", "Rock music is a broad genre of popular music that originated as rock and roll in the United States in the late 1940s and early 1950s."),
    ("Pop", "Pop music is a genre of popular music that originated in its modern form during the mid-1950s in the United States and the United Kingdom."),
    ("Hip Hop", "Hip hop music, also known as rap music, is a genre of popular music that originated in New York City in the 1970s."),
    ("Electronic", "Electronic music is music that employs electronic musical instruments, digital instruments, or circuitry-based music technology in its creation."),
    ("Jazz", "Jazz is a music genre that originated in the African-American communities of New Orleans, Louisiana, in the late 19th and early 20th centuries."),
    ("Classical", "Classical music is art music produced or rooted in the traditions of Western culture, including both liturgical and secular music."),
    ("R&B", "Rhythm and blues, often abbreviated as R&B, is a genre of popular music that originated in African-American communities in the 1940s."),
    ("Country", "Country music, also known as country and western, is a genre of popular music that originated in the Southern United States in the early 1920s."),
];

const RECORD_LABELS: &[(&str, &str, &str)] = &[
    ("Columbia Records", "https://www.columbiarecords.com", "United States"),
    ("Atlantic Records", "https://www.atlanticrecords.com", "United States"),
    ("Interscope Records", "https://www.interscope.com", "United States"),
    ("Warner Records", "https://www.warnerrecords.com", "United States"),
    ("Island Records", "https://www.islandrecords.com", "United Kingdom"),
    ("Capitol Records", "https://www.capitolrecords.com", "United States"),
];

struct ArtistSeed {
    name: &'static str,
    bio: &'static str,
    country: &'static str,
    website: &'static str,
    image_url: &'static str,
}

const ARTISTS: &[ArtistSeed] = &[
    ArtistSeed {
        name: "The Beatles",
        bio: "The Beatles were an English rock band formed in Liverpool in 1960.",
        country: "United Kingdom",
        website: "https://www.thebeatles.com",
        image_url: "https://example.com/beatles.jpg",
    },
    ArtistSeed {
        name: "Michael Jackson",
        bio: "Michael Joseph Jackson was an American singer, songwriter, and dancer.",
        country: "United States",
        website: "https://www.michaeljackson.com",
        image_url: "https://example.com/mj.jpg",
    },
    ArtistSeed {
        name: "Queen",
        bio: "Queen are a British rock band formed in London in 1970.",
        country: "United Kingdom",
        website: "https://www.queenonline.com",
        image_url: "https://example.com/queen.jpg",
    },
    ArtistSeed {
        name: "Taylor Swift",
        bio: "Taylor Alison Swift is an American singer-songwriter.",
        country: "United States",
        website: "https://www.taylorswift.com",
        image_url: "https://example.com/taylor.jpg",
    },
    ArtistSeed {
        name: "Kendrick Lamar",
        bio: "Kendrick Lamar Duckworth is an American rapper, songwriter, and record producer.",
        country: "United States",
        website: "https://www.kendricklamar.com",
        image_url: "https://example.com/kendrick.jpg",
    },
];

struct AlbumSeed {
    title: &'static str,
    artist: &'static str,
    genre: &'static str,
    label: &'static str,
    released: (i32, u32, u32),
    duration_in_seconds: i64,
    cover_image_url: &'static str,
    description: &'static str,
    tracks: &'static [(&'static str, i64)],
}

const ALBUMS: &[AlbumSeed] = &[
    AlbumSeed {
        title: "Abbey Road",
        artist: "The Beatles",
        genre: "Rock",
        label: "Atlantic Records",
        released: (1969, 9, 26),
        duration_in_seconds: 2532,
        cover_image_url: "https://example.com/abbey_road.jpg",
        description: "Abbey Road is the eleventh studio album by the English rock band the Beatles, released on 26 September 1969.",
        tracks: &[
            ("Come Together", 259),
            ("Something", 183),
            ("Maxwell's Silver Hammer", 207),
            ("Oh! Darling", 207),
            ("Octopus's Garden", 171),
        ],
    },
    AlbumSeed {
        title: "Thriller",
        artist: "Michael Jackson",
        genre: "Pop",
        label: "Columbia Records",
        released: (1982, 11, 30),
        duration_in_seconds: 2408,
        cover_image_url: "https://example.com/thriller.jpg",
        description: "Thriller is the sixth studio album by American singer Michael Jackson, released on November 30, 1982.",
        tracks: &[
            ("Wanna Be Startin' Somethin'", 363),
            ("Baby Be Mine", 260),
            ("The Girl Is Mine", 222),
            ("Thriller", 357),
            ("Beat It", 258),
        ],
    },
    AlbumSeed {
        title: "A Kind of Magic",
        artist: "Queen",
        genre: "Rock",
        label: "Atlantic Records",
        released: (1986, 6, 2),
        duration_in_seconds: 2315,
        cover_image_url: "https://example.com/a_kind_of_magic.jpg",
        description: "A Kind of Magic is the twelfth studio album by the British rock band Queen, released on 2 June 1986.",
        tracks: &[
            ("One Vision", 310),
            ("A Kind of Magic", 263),
            ("One Year of Love", 266),
            ("Pain Is So Close to Pleasure", 254),
            ("Friends Will Be Friends", 248),
        ],
    },
    AlbumSeed {
        title: "To Pimp a Butterfly",
        artist: "Kendrick Lamar",
        genre: "Hip Hop",
        label: "Interscope Records",
        released: (2015, 3, 15),
        duration_in_seconds: 4888,
        cover_image_url: "https://example.com/tpab.jpg",
        description: "To Pimp a Butterfly is the third studio album by American rapper Kendrick Lamar, released on March 15, 2015.",
        tracks: &[
            ("Wesley's Theory", 287),
            ("For Free? (Interlude)", 130),
            ("King Kunta", 234),
            ("Institutionalized", 274),
            ("These Walls", 300),
        ],
    },
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub genres: usize,
    pub record_labels: usize,
    pub artists: usize,
    pub albums: usize,
    pub tracks: usize,
    pub users: usize,
    pub reviews: usize,
}

/// Seed the catalog when it has no albums and no artists.
///
/// Returns `None` when existing data made the seeder skip.
pub async fn seed_database(db: &DatabaseConnection) -> Result<Option<SeedReport>> {
    let uow = UnitOfWork::new(db.clone());

    if uow.albums().query().count().await? > 0 || uow.artists().query().count().await? > 0 {
        info!("Catalog already has data, skipping seed");
        return Ok(None);
    }

    let mut report = SeedReport::default();
    let now = Utc::now();

    let genres: Vec<_> = GENRES
        .iter()
        .map(|(name, description)| {
            uow.genres().add(genre::ActiveModel {
                id: NotSet,
                name: Set(name.to_string()),
                description: Set(Some(description.to_string())),
            })
        })
        .collect();
    uow.save_changes().await?;
    let genres = by_name(genres, |g: &genre::Model| g.name.clone(), |g| g.id)?;
    report.genres = genres.len();

    let labels: Vec<_> = RECORD_LABELS
        .iter()
        .map(|(name, website, country)| {
            uow.record_labels().add(record_label::ActiveModel {
                id: NotSet,
                name: Set(name.to_string()),
                website: Set(Some(website.to_string())),
                country: Set(Some(country.to_string())),
            })
        })
        .collect();
    uow.save_changes().await?;
    let labels = by_name(labels, |l: &record_label::Model| l.name.clone(), |l| l.id)?;
    report.record_labels = labels.len();

    let artists: Vec<_> = ARTISTS
        .iter()
        .map(|seed| {
            uow.artists().add(artist::ActiveModel {
                id: NotSet,
                name: Set(seed.name.to_string()),
                bio: Set(Some(seed.bio.to_string())),
                country: Set(Some(seed.country.to_string())),
                website: Set(Some(seed.website.to_string())),
                image_url: Set(Some(seed.image_url.to_string())),
                created_at: Set(now.into()),
                updated_at: Set(now.into()),
            })
        })
        .collect();
    uow.save_changes().await?;
    let artists = by_name(artists, |a: &artist::Model| a.name.clone(), |a| a.id)?;
    report.artists = artists.len();

    let mut albums = Vec::with_capacity(ALBUMS.len());
    for seed in ALBUMS {
        let (year, month, day) = seed.released;
        let staged = uow.albums().add(album::ActiveModel {
            id: NotSet,
            title: Set(seed.title.to_string()),
            album_artist: Set(Some(seed.artist.to_string())),
            artist_id: Set(artists.get(seed.artist).copied()),
            genre_id: Set(genres.get(seed.genre).copied()),
            record_label_id: Set(labels.get(seed.label).copied()),
            release_date: Set(NaiveDate::from_ymd_opt(year, month, day)),
            duration_in_seconds: Set(seed.duration_in_seconds),
            cover_image_url: Set(Some(seed.cover_image_url.to_string())),
            description: Set(Some(seed.description.to_string())),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        });
        albums.push((seed, staged));
    }
    uow.save_changes().await?;

    let mut seeded_albums = Vec::with_capacity(albums.len());
    for (seed, staged) in albums {
        let album = staged.into_saved()?;
        for (number, (title, duration)) in seed.tracks.iter().enumerate() {
            uow.tracks().add(track::ActiveModel {
                id: NotSet,
                title: Set(title.to_string()),
                track_number: Set(number as i32 + 1),
                duration_in_seconds: Set(*duration),
                album_id: Set(album.id),
            });
            report.tracks += 1;
        }
        seeded_albums.push((seed, album));
    }
    uow.save_changes().await?;
    report.albums = seeded_albums.len();

    let test_user = seed_user(&uow, "testuser", "test@example.com", "Password123!", "User")?;
    let admin = seed_user(&uow, "admin", "admin@example.com", "Admin123!", "Admin")?;
    uow.save_changes().await?;
    let (test_user, admin) = (test_user.into_saved()?, admin.into_saved()?);
    report.users = 2;

    // ThreadRng is not Send; keep it out of scope across the await below.
    {
        let mut rng = rand::thread_rng();
        for (seed, album) in &seeded_albums {
            let reviews = [
                (
                    &test_user,
                    rng.gen_range(3..=5),
                    format!("Great album! I love {} by {}.", album.title, seed.artist),
                ),
                (
                    &admin,
                    rng.gen_range(4..=5),
                    format!(
                        "As a music critic, I find {} to be a masterpiece of {} music.",
                        album.title, seed.genre
                    ),
                ),
            ];
            for (author, rating, comment) in reviews {
                let written = now - Duration::days(rng.gen_range(1..30));
                uow.reviews().add(review::ActiveModel {
                    id: NotSet,
                    album_id: Set(album.id),
                    user_id: Set(author.id.clone()),
                    rating: Set(rating),
                    comment: Set(Some(comment)),
                    created_at: Set(written.into()),
                    updated_at: Set(now.into()),
                });
                report.reviews += 1;
            }
        }
    }
    uow.save_changes().await?;

    info!(
        "Seeded {} genres, {} labels, {} artists, {} albums, {} tracks, {} users, {} reviews",
        report.genres,
        report.record_labels,
        report.artists,
        report.albums,
        report.tracks,
        report.users,
        report.reviews
    );

    Ok(Some(report))
}

fn seed_user(
    uow: &UnitOfWork,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> Result<crate::db::repositories::Staged<user::Model>> {
    let credentials = PasswordCredentials::new(password)?;
    let now = Utc::now();
    Ok(uow.users().add(user::ActiveModel {
        id: Set(Uuid::new_v4().to_string()),
        username: Set(username.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(credentials.hash),
        password_salt: Set(credentials.salt),
        role: Set(Some(role.to_string())),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }))
}

fn by_name<M: Clone>(
    staged: Vec<crate::db::repositories::Staged<M>>,
    name: impl Fn(&M) -> String,
    id: impl Fn(&M) -> i32,
) -> Result<HashMap<String, i32>> {
    staged
        .into_iter()
        .map(|s| {
            let model = s.into_saved()?;
            Ok((name(&model), id(&model)))
        })
        .collect::<std::result::Result<_, AppError>>()
}
