//! Track state — the four fixed frequency-band tracks and the pure
//! update/resolution rules shared by the live and offline signal paths.
//!
//! Tracks are plain records mutated only through [`apply_track_update`],
//! which enforces solo exclusivity as a pure transformation so the rule is
//! testable without any audio runtime.

use serde::{Deserialize, Serialize};

use crate::dsp::filter::FilterType;

/// One frequency-band track. Four fixed instances exist per session;
/// `id`, `name` and the filter design are immutable, the rest is
/// user-editable through the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: u32,
    pub name: String,
    /// Dry-path level, 0–100.
    pub volume: u32,
    /// Wet-path (reverb send) level, 0–100.
    pub reverb: u32,
    pub is_muted: bool,
    pub is_solo: bool,
    pub filter_type: FilterType,
    /// Cutoff/center frequency in Hz, fixed per band design.
    pub filter_freq: f64,
    /// Resonance/bandwidth factor, fixed per band design.
    pub filter_q: f64,
}

impl Track {
    fn band(id: u32, name: &str, filter_type: FilterType, filter_freq: f64, filter_q: f64) -> Self {
        Track {
            id,
            name: name.to_string(),
            volume: 80,
            reverb: 0,
            is_muted: false,
            is_solo: false,
            filter_type,
            filter_freq,
            filter_q,
        }
    }
}

/// The four fixed bands. Aggressive filter designs so soloing each track
/// sounds dramatically different: sub-bass rumble, drum punch, vocal
/// presence, and top-end air.
pub fn default_tracks() -> Vec<Track> {
    vec![
        Track::band(1, "Deep Pulse", FilterType::Lowpass, 100.0, 1.0),
        Track::band(2, "Core Punch", FilterType::Bandpass, 250.0, 4.0),
        Track::band(3, "Vocal Channel", FilterType::Bandpass, 1500.0, 5.0),
        Track::band(4, "Air & Sparkle", FilterType::Highpass, 8000.0, 1.0),
    ]
}

/// Replace the track matching `update.id` and re-establish the solo
/// invariant: if the replacement is soloed, every other track loses its
/// solo flag in the same pass. Unknown ids leave the list unchanged.
pub fn apply_track_update(tracks: &[Track], update: Track) -> Vec<Track> {
    let solo_id = update.is_solo.then_some(update.id);
    tracks
        .iter()
        .map(|t| {
            if t.id == update.id {
                update.clone()
            } else if solo_id.is_some() && t.is_solo {
                Track {
                    is_solo: false,
                    ..t.clone()
                }
            } else {
                t.clone()
            }
        })
        .collect()
}

/// A track is effectively silent if it is muted, or if some *other*
/// track is soloed. This single predicate feeds both the live parameter
/// synchronizer and the offline renderer.
pub fn is_effectively_silent(track: &Track, tracks: &[Track]) -> bool {
    if track.is_muted {
        return true;
    }
    tracks.iter().any(|t| t.is_solo && t.id != track.id)
}

/// Resolved gain target for one track's dry and wet paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackLevels {
    pub id: u32,
    /// Dry gain, 0.0–1.0.
    pub dry: f64,
    /// Reverb-send gain, 0.0–1.0.
    pub wet: f64,
}

/// The full resolved mix: one [`TrackLevels`] per track plus the master
/// gain, all scaled to 0.0–1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MixLevels {
    pub tracks: Vec<TrackLevels>,
    pub master: f64,
}

/// Apply the mute/solo resolution rule to every track and the master
/// level. Both graph variants parameterize their gains from this value,
/// so live and render mixes cannot classify a track differently.
pub fn resolve_levels(tracks: &[Track], master_volume: u32) -> MixLevels {
    let resolved = tracks
        .iter()
        .map(|track| {
            let silent = is_effectively_silent(track, tracks);
            TrackLevels {
                id: track.id,
                dry: if silent { 0.0 } else { track.volume.min(100) as f64 / 100.0 },
                wet: if silent { 0.0 } else { track.reverb.min(100) as f64 / 100.0 },
            }
        })
        .collect();

    MixLevels {
        tracks: resolved,
        master: master_volume.min(100) as f64 / 100.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn soloed(tracks: &[Track], id: u32) -> Vec<Track> {
        let mut update = tracks.iter().find(|t| t.id == id).unwrap().clone();
        update.is_solo = true;
        apply_track_update(tracks, update)
    }

    #[test]
    fn four_default_bands() {
        let tracks = default_tracks();
        assert_eq!(tracks.len(), 4);
        assert!(tracks.iter().all(|t| t.volume == 80 && t.reverb == 0));
        assert!(tracks.iter().all(|t| !t.is_muted && !t.is_solo));
        assert_eq!(tracks[0].filter_type, FilterType::Lowpass);
        assert_eq!(tracks[3].filter_type, FilterType::Highpass);
    }

    #[test]
    fn solo_is_exclusive() {
        let tracks = default_tracks();
        let tracks = soloed(&tracks, 1);
        let tracks = soloed(&tracks, 3);

        let soloed_ids: Vec<u32> = tracks.iter().filter(|t| t.is_solo).map(|t| t.id).collect();
        assert_eq!(soloed_ids, vec![3], "soloing track 3 must unsolo track 1");
    }

    #[test]
    fn unsolo_leaves_others_untouched() {
        let tracks = soloed(&default_tracks(), 2);
        let mut update = tracks[1].clone();
        update.is_solo = false;
        let tracks = apply_track_update(&tracks, update);
        assert!(tracks.iter().all(|t| !t.is_solo));
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let tracks = default_tracks();
        let mut ghost = tracks[0].clone();
        ghost.id = 99;
        ghost.volume = 0;
        let updated = apply_track_update(&tracks, ghost);
        assert_eq!(updated, tracks);
    }

    #[test]
    fn non_solo_edit_preserves_volume_change() {
        let tracks = default_tracks();
        let mut update = tracks[0].clone();
        update.volume = 55;
        update.reverb = 30;
        let tracks = apply_track_update(&tracks, update);
        assert_eq!(tracks[0].volume, 55);
        assert_eq!(tracks[0].reverb, 30);
    }

    #[test]
    fn default_mix_scenario() {
        // 4 default tracks, no mute/solo, master 80.
        let levels = resolve_levels(&default_tracks(), 80);
        assert!((levels.master - 0.8).abs() < 1e-12);
        for t in &levels.tracks {
            assert!((t.dry - 0.8).abs() < 1e-12, "track {} dry should be 0.8", t.id);
            assert!((t.wet - 0.0).abs() < 1e-12);
        }
    }

    #[test]
    fn solo_silences_everyone_else() {
        let mut tracks = default_tracks();
        for t in &mut tracks {
            t.reverb = 40;
        }
        let tracks = soloed(&tracks, 2);
        let levels = resolve_levels(&tracks, 100);

        for t in &levels.tracks {
            if t.id == 2 {
                assert!((t.dry - 0.8).abs() < 1e-12, "soloed track keeps its level");
                assert!((t.wet - 0.4).abs() < 1e-12);
            } else {
                assert_eq!(t.dry, 0.0, "track {} should be silent", t.id);
                assert_eq!(t.wet, 0.0);
            }
        }
    }

    #[test]
    fn mute_and_solo_combined() {
        // Track 1 muted and track 2 soloed: 1 silent, 2 audible, 3/4 silent.
        let mut tracks = default_tracks();
        tracks[0].is_muted = true;
        let tracks = soloed(&tracks, 2);
        let levels = resolve_levels(&tracks, 80);

        assert_eq!(levels.tracks[0].dry, 0.0);
        assert!((levels.tracks[1].dry - 0.8).abs() < 1e-12);
        assert_eq!(levels.tracks[2].dry, 0.0);
        assert_eq!(levels.tracks[3].dry, 0.0);
    }

    #[test]
    fn silence_predicate_matches_resolved_levels() {
        // Every mute combination with and without a soloed track: the
        // predicate and the resolved levels must classify identically.
        for mute_mask in 0u32..16 {
            for solo in [None, Some(1u32), Some(2), Some(3), Some(4)] {
                let mut tracks = default_tracks();
                for (i, t) in tracks.iter_mut().enumerate() {
                    t.is_muted = mute_mask & (1 << i) != 0;
                    t.is_solo = solo == Some(t.id);
                }
                let levels = resolve_levels(&tracks, 80);
                for (track, level) in tracks.iter().zip(&levels.tracks) {
                    let silent = is_effectively_silent(track, &tracks);
                    assert_eq!(
                        silent,
                        level.dry == 0.0,
                        "mask {mute_mask:04b} solo {solo:?} track {}",
                        track.id
                    );
                }
            }
        }
    }

    #[test]
    fn level_boundaries() {
        let mut tracks = default_tracks();
        tracks[0].volume = 0;
        tracks[0].reverb = 100;
        tracks[1].volume = 100;
        let levels = resolve_levels(&tracks, 0);

        assert_eq!(levels.tracks[0].dry, 0.0, "volume 0 is a fully silent dry path");
        assert!((levels.tracks[0].wet - 1.0).abs() < 1e-12, "reverb 100 is unity send");
        assert!((levels.tracks[1].dry - 1.0).abs() < 1e-12, "volume 100 is unity gain");
        assert_eq!(levels.master, 0.0);
    }

    #[test]
    fn out_of_range_levels_clamp() {
        let mut tracks = default_tracks();
        tracks[0].volume = 250;
        let levels = resolve_levels(&tracks, 130);
        assert!((levels.tracks[0].dry - 1.0).abs() < 1e-12);
        assert!((levels.master - 1.0).abs() < 1e-12);
    }

    #[test]
    fn track_json_shape() {
        let tracks = default_tracks();
        let json = serde_json::to_string(&tracks[0]).unwrap();
        assert!(json.contains("\"isMuted\""));
        assert!(json.contains("\"filterType\":\"lowpass\""));
        assert!(json.contains("\"filterFreq\":100.0"));

        let back: Track = serde_json::from_str(&json).unwrap();
        assert_eq!(back, tracks[0]);
    }
}
