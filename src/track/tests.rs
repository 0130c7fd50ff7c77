use super::format::format_duration;
use super::locator::{locator_to_path, resolve_locator};
use super::source::{containing_dir, describe_audio_file, find_cover_art, load_track_file};
use super::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

#[test]
fn format_duration_edge_cases() {
    assert_eq!(format_duration(0.0), "0:00");
    assert_eq!(format_duration(59.999), "0:59");
    assert_eq!(format_duration(60.0), "1:00");
    assert_eq!(format_duration(225.7), "3:45");
    assert_eq!(format_duration(3725.0), "62:05");
    assert_eq!(format_duration(-4.0), "0:00");
    assert_eq!(format_duration(f64::NAN), "0:00");
}

#[test]
fn format_duration_parses_back_to_minutes_and_seconds() {
    for s in (0u64..4000).chain([86_399, 1_000_000]) {
        let text = format_duration(s as f64);
        let (min, sec) = text.split_once(':').unwrap();
        assert!(!min.is_empty() && min.chars().all(|c| c.is_ascii_digit()), "{text}");
        assert_eq!(sec.len(), 2, "{text}");
        assert!(sec.chars().all(|c| c.is_ascii_digit()), "{text}");
        assert_eq!(min.parse::<u64>().unwrap(), s / 60);
        assert_eq!(sec.parse::<u64>().unwrap(), s % 60);
    }
}

#[test]
fn locators_resolve_against_base_dir() {
    let base = Path::new("/srv/tracks");
    assert_eq!(resolve_locator(Some(base), "music.mp3"), "/srv/tracks/music.mp3");
    assert_eq!(resolve_locator(Some(base), "/abs/a.mp3"), "/abs/a.mp3");
    assert_eq!(
        resolve_locator(Some(base), "file:///abs/a.mp3"),
        "file:///abs/a.mp3"
    );
    assert_eq!(resolve_locator(None, "music.mp3"), "music.mp3");
    assert_eq!(resolve_locator(Some(Path::new("")), "music.mp3"), "music.mp3");

    assert_eq!(locator_to_path("file:///abs/a.mp3"), PathBuf::from("/abs/a.mp3"));
    assert_eq!(locator_to_path(" rel/a.mp3 "), PathBuf::from("rel/a.mp3"));
}

#[test]
fn source_from_arg_picks_kind_by_extension() {
    assert_eq!(TrackSource::from_arg(None).unwrap(), TrackSource::Demo);
    assert_eq!(
        TrackSource::from_arg(Some("a/track.TOML")).unwrap(),
        TrackSource::File(PathBuf::from("a/track.TOML"))
    );
    assert_eq!(
        TrackSource::from_arg(Some("song.flac")).unwrap(),
        TrackSource::Audio(PathBuf::from("song.flac"))
    );
    assert!(matches!(
        TrackSource::from_arg(Some("notes.txt")),
        Err(TrackError::Unsupported(_))
    ));
}

#[test]
fn track_file_accepts_camel_case_and_resolves_locators() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("track.toml");
    fs::write(
        &path,
        r#"
title = "Starry Dreams"
artist = "Luna Melody"
audioUrl = "music.mp3"
albumArt = "albumCover1.jpeg"
length = "3:45"
addedOn = "20 Jan 2024"
tempo = "60 BPM"
"#,
    )
    .unwrap();

    let track = TrackSource::File(path).load().unwrap();
    assert_eq!(track.title, "Starry Dreams");
    assert_eq!(
        track.audio_url,
        dir.path().join("music.mp3").display().to_string()
    );
    assert_eq!(
        track.album_art_url,
        dir.path().join("albumCover1.jpeg").display().to_string()
    );
    assert_eq!(track.added_on, "20 Jan 2024");
    // absent display fields default to empty
    assert_eq!(track.genre, "");
    assert_eq!(track.mood, "");
}

#[test]
fn track_file_errors_name_the_file() {
    let dir = tempdir().unwrap();

    let missing = dir.path().join("missing.toml");
    let err = load_track_file(&missing).unwrap_err();
    assert!(matches!(err, TrackError::Read { .. }));
    assert!(err.to_string().contains("missing.toml"));

    let bad = dir.path().join("bad.toml");
    fs::write(&bad, "title = \"no audio url\"\n").unwrap();
    let err = load_track_file(&bad).unwrap_err();
    assert!(matches!(err, TrackError::Parse { .. }));
    assert!(err.to_string().contains("bad.toml"));
}

#[test]
fn audio_file_without_tags_falls_back_to_stem_and_finds_cover() {
    let dir = tempdir().unwrap();
    let audio = dir.path().join("Night Drive.mp3");
    fs::write(&audio, b"not a real mp3").unwrap();
    fs::write(dir.path().join("Folder.JPG"), b"img").unwrap();
    fs::write(dir.path().join("cover.png"), b"img").unwrap();
    fs::write(dir.path().join("back.jpg"), b"img").unwrap();

    let track = describe_audio_file(&audio);
    assert_eq!(track.title, "Night Drive");
    assert_eq!(track.artist, "");
    assert_eq!(track.audio_url, audio.display().to_string());
    assert_eq!(
        track.album_art_url,
        dir.path().join("cover.png").display().to_string()
    );
}

/// Runs with the process working directory set to `dir`, restoring it after.
struct CwdGuard(PathBuf);

impl CwdGuard {
    fn enter(dir: &Path) -> Self {
        let prev = std::env::current_dir().unwrap();
        std::env::set_current_dir(dir).unwrap();
        CwdGuard(prev)
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.0);
    }
}

#[test]
fn bare_file_name_looks_for_cover_in_working_directory() {
    assert_eq!(containing_dir(Path::new("song.flac")), Path::new("."));
    assert_eq!(containing_dir(Path::new("a/song.flac")), Path::new("a"));
    assert_eq!(containing_dir(Path::new("/song.flac")), Path::new("/"));

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("song.flac"), b"not a real flac").unwrap();
    fs::write(dir.path().join("cover.jpg"), b"img").unwrap();

    let track = {
        let _cwd = CwdGuard::enter(dir.path());
        describe_audio_file(Path::new("song.flac"))
    };
    assert_eq!(track.title, "song");
    assert_eq!(track.audio_url, "song.flac");
    assert_eq!(
        Path::new(&track.album_art_url).file_name(),
        Some(std::ffi::OsStr::new("cover.jpg"))
    );
}

#[test]
fn find_cover_art_ignores_subdirectories_and_other_images() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("scans");
    fs::create_dir_all(&sub).unwrap();
    fs::write(sub.join("cover.jpg"), b"img").unwrap();
    fs::write(dir.path().join("booklet.jpg"), b"img").unwrap();
    assert_eq!(find_cover_art(dir.path()), None);

    fs::write(dir.path().join("front.jpeg"), b"img").unwrap();
    assert_eq!(find_cover_art(dir.path()), Some(dir.path().join("front.jpeg")));
}

#[test]
fn demo_grid_lists_seven_fields_in_order() {
    let demo = TrackDescriptor::demo();
    let labels: Vec<&str> = demo.grid_fields().iter().map(|(l, _)| *l).collect();
    assert_eq!(
        labels,
        ["Length", "Genre", "Added On", "Mood", "Instruments", "Key", "Tempo"]
    );
    assert_eq!(demo.grid_fields()[6].1, "60 BPM");
}
