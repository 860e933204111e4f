use chrono::NaiveDate;

use super::genres::genre_vector;
use super::{CatalogGame, GameCatalog};
use crate::db::{Database, NewGame};
use crate::error::PipelineResult;
use crate::soundtrack::{record, AlbumChooser, MusicCatalog, SoundtrackResolver};

/// Counters for one import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub games_seen: usize,
    pub games_added: usize,
    /// Titles that were stored by an earlier run and left untouched.
    pub already_stored: usize,
    pub albums_added: usize,
    /// New games whose soundtrack was skipped.
    pub skipped: usize,
}

/// `YYYY-MM-DD`, or `None` when missing or unparseable.
pub fn parse_release_date(released: Option<&str>) -> Option<NaiveDate> {
    let raw = released?;
    match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(e) => {
            tracing::warn!(released = %raw, error = %e, "Unparseable release date");
            None
        }
    }
}

/// Records a developer's games and, through the resolver, their soundtrack
/// albums.
pub struct CatalogImporter<'a, G, M, C> {
    db: &'a Database,
    games: G,
    resolver: SoundtrackResolver<M, C>,
    max_pages: u32,
}

impl<'a, G: GameCatalog, M: MusicCatalog, C: AlbumChooser> CatalogImporter<'a, G, M, C> {
    pub fn new(db: &'a Database, games: G, resolver: SoundtrackResolver<M, C>, max_pages: u32) -> Self {
        Self {
            db,
            games,
            resolver,
            max_pages,
        }
    }

    pub fn import(&mut self, developer_name: &str) -> PipelineResult<ImportSummary> {
        let developer = self.games.find_developer(developer_name)?;
        let developer_id = self.db.upsert_developer(developer_name)?.id();

        tracing::info!(
            developer = %developer_name,
            catalog_id = developer.id,
            pages = self.max_pages,
            "Importing games"
        );

        let mut summary = ImportSummary::default();

        for page_number in 1..=self.max_pages {
            let page = match self.games.games_page(developer.id, page_number) {
                Ok(page) => page,
                Err(e) if e.is_skip() => {
                    tracing::warn!(page = page_number, error = %e, "Failed to fetch games page");
                    break;
                }
                Err(e) => return Err(e),
            };

            for game in &page.games {
                summary.games_seen += 1;
                self.import_game(developer_id, game, &mut summary)?;
            }

            if !page.has_next {
                break;
            }
        }

        tracing::info!(
            developer = %developer_name,
            seen = summary.games_seen,
            added = summary.games_added,
            already = summary.already_stored,
            albums = summary.albums_added,
            skipped = summary.skipped,
            "Import finished"
        );

        Ok(summary)
    }

    fn import_game(&mut self, developer_id: i64, game: &CatalogGame, summary: &mut ImportSummary) -> PipelineResult<()> {
        // A stored title means its soundtrack decision was already made.
        if self.db.game_id(&game.title)?.is_some() {
            tracing::info!(game = %game.title, "Game already stored");
            summary.already_stored += 1;
            return Ok(());
        }

        let selection = self.resolver.resolve(&game.title)?;

        let game_id = self
            .db
            .insert_game_if_absent(&NewGame {
                developer_id,
                title: game.title.clone(),
                release_date: parse_release_date(game.released.as_deref()),
                genres: genre_vector(&game.tags),
            })?
            .id();
        summary.games_added += 1;

        match selection {
            Some(selection) => {
                if record(self.db, &selection, game_id)?.album.was_created() {
                    summary.albums_added += 1;
                }
            }
            None => summary.skipped += 1,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::genres::GENRES;
    use crate::catalog::{CatalogDeveloper, GamePage};
    use crate::config::SoundtrackConfig;
    use crate::error::{ErrorKind, PipelineError};
    use crate::soundtrack::{Choice, ConsoleChooser};
    use crate::testing::{album, game, memory_db, FakeGameCatalog, FakeMusicCatalog, ScriptedChooser};

    fn capcom() -> FakeGameCatalog {
        FakeGameCatalog {
            developer: Some(CatalogDeveloper { id: 1612, name: "Capcom".into() }),
            pages: vec![
                GamePage {
                    games: vec![
                        game("Okami", Some("2006-04-20"), &["Action", "Adventure"]),
                        game("Pragmata", None, &["Action", "Shooter"]),
                    ],
                    has_next: true,
                },
                GamePage {
                    games: vec![game("Mega Man 11", Some("not a date"), &["Platformer"])],
                    has_next: false,
                },
            ],
            ..FakeGameCatalog::default()
        }
    }

    fn music() -> FakeMusicCatalog {
        let mut catalog = FakeMusicCatalog::default();
        catalog.search_results.insert(
            "Okami soundtrack".into(),
            vec![album("ok1", "Okami Original Soundtrack", &["Masami Ueda", "Rei Kondoh"])],
        );
        catalog.search_results.insert(
            "Mega Man 11 soundtrack".into(),
            vec![
                album("mm1", "Mega Man 11 Soundtrack", &["Marika Suzuki"]),
                album("mm2", "Mega Man 11 Remixes", &["Various"]),
            ],
        );
        catalog
    }

    #[test]
    fn test_import_pages_and_records() {
        let db = memory_db();
        let games = capcom();
        let mut music = music();
        // Pragmata has no candidates and is never offered to the chooser.
        let mut chooser = ScriptedChooser::new(vec![Choice::Select(0), Choice::Skip]);

        let resolver = SoundtrackResolver::new(&mut music, &mut chooser, &SoundtrackConfig::default());
        let mut importer = CatalogImporter::new(&db, &games, resolver, 3);
        let summary = importer.import("Capcom").unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                games_seen: 3,
                games_added: 3,
                already_stored: 0,
                albums_added: 1,
                skipped: 2,
            }
        );
        assert_eq!(games.requested_pages.borrow().as_slice(), &[1, 2]);

        let okami = db.get_game("Okami").unwrap().unwrap();
        assert_eq!(okami.release_date.as_deref(), Some("2006-04-20"));
        let mega_man = db.get_game("Mega Man 11").unwrap().unwrap();
        assert_eq!(mega_man.release_date, None);

        let stats = db.stats().unwrap();
        assert_eq!(stats.developers, 1);
        assert_eq!(stats.artists, 1);
        assert_eq!(stats.albums_pending, 1);
    }

    #[test]
    fn test_reimport_is_first_write_wins() {
        let db = memory_db();
        let mut music = music();

        let mut chooser = ScriptedChooser::new(vec![Choice::Select(0), Choice::Skip]);
        let games = capcom();
        let resolver = SoundtrackResolver::new(&mut music, &mut chooser, &SoundtrackConfig::default());
        CatalogImporter::new(&db, &games, resolver, 3).import("Capcom").unwrap();
        let before = db.get_game("Okami").unwrap().unwrap();

        // Same titles come back with different tags; nothing is rewritten
        // and nobody is asked again.
        let mut changed = capcom();
        changed.pages[0].games[0] = game("Okami", Some("2017-12-12"), &["Puzzle"]);
        let mut second_chooser = ScriptedChooser::new(vec![]);
        let resolver = SoundtrackResolver::new(&mut music, &mut second_chooser, &SoundtrackConfig::default());
        let summary = CatalogImporter::new(&db, &changed, resolver, 3).import("Capcom").unwrap();

        assert_eq!(summary.already_stored, 3);
        assert_eq!(summary.games_added, 0);
        assert_eq!(second_chooser.asked, 0);
        assert_eq!(db.get_game("Okami").unwrap().unwrap(), before);
        assert_eq!(db.stats().unwrap().games, 3);
    }

    #[test]
    fn test_genre_vector_is_stored_in_column_order() {
        let db = memory_db();
        let games = FakeGameCatalog {
            developer: Some(CatalogDeveloper { id: 1, name: "Capcom".into() }),
            pages: vec![GamePage {
                games: vec![game("Dragon's Dogma", Some("2012-05-22"), &["Action", "RPG", "Open World"])],
                has_next: false,
            }],
            ..FakeGameCatalog::default()
        };
        let mut music = FakeMusicCatalog::default();
        let mut chooser = ScriptedChooser::new(vec![]);
        let resolver = SoundtrackResolver::new(&mut music, &mut chooser, &SoundtrackConfig::default());
        CatalogImporter::new(&db, &games, resolver, 1).import("Capcom").unwrap();

        let stored = db.get_game("Dragon's Dogma").unwrap().unwrap();
        for (genre, value) in GENRES.iter().zip(stored.genres.iter()) {
            let expected = u8::from(genre.label == "Action" || genre.label == "RPG");
            assert_eq!(*value, expected, "{}", genre.column);
        }
    }

    #[test]
    fn test_unknown_developer() {
        let db = memory_db();
        let games = FakeGameCatalog::default();
        let mut music = FakeMusicCatalog::default();
        let mut chooser = ScriptedChooser::new(vec![]);
        let resolver = SoundtrackResolver::new(&mut music, &mut chooser, &SoundtrackConfig::default());

        let err = CatalogImporter::new(&db, &games, resolver, 1).import("Nobody").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(db.stats().unwrap().developers, 0);
    }

    #[test]
    fn test_rate_limited_search_aborts_before_storing_game() {
        let db = memory_db();
        let games = capcom();
        let mut music = FakeMusicCatalog::default();
        music.search_error = Some(|| PipelineError::RateLimited { service: "spotify", retries: 2 });
        let mut chooser = ScriptedChooser::new(vec![]);
        let resolver = SoundtrackResolver::new(&mut music, &mut chooser, &SoundtrackConfig::default());

        let err = CatalogImporter::new(&db, &games, resolver, 3).import("Capcom").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RateLimited);
        assert_eq!(db.stats().unwrap().games, 0);
    }

    #[test]
    fn test_closed_input_stores_nothing_and_offers_again() {
        let db = memory_db();
        let games = capcom();
        let mut music = music();

        let mut console = ConsoleChooser::new(std::io::Cursor::new(Vec::new()), Vec::new());
        let resolver = SoundtrackResolver::new(&mut music, &mut console, &SoundtrackConfig::default());
        let err = CatalogImporter::new(&db, &games, resolver, 3).import("Capcom").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Interrupted);
        assert_eq!(db.stats().unwrap().games, 0);

        let mut chooser = ScriptedChooser::new(vec![Choice::Select(0), Choice::Select(0)]);
        let resolver = SoundtrackResolver::new(&mut music, &mut chooser, &SoundtrackConfig::default());
        let summary = CatalogImporter::new(&db, &games, resolver, 3).import("Capcom").unwrap();

        assert_eq!(chooser.asked, 2);
        assert_eq!(summary.already_stored, 0);
        assert_eq!(summary.albums_added, 2);
        assert_eq!(db.stats().unwrap().albums_pending, 2);
    }

    #[test]
    fn test_release_dates() {
        assert_eq!(
            parse_release_date(Some("2018-01-26")),
            NaiveDate::from_ymd_opt(2018, 1, 26)
        );
        assert_eq!(parse_release_date(Some("2018")), None);
        assert_eq!(parse_release_date(None), None);
    }
}
