use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

/// Shading palette for one planet surface. Loaded from numbered JSON files;
/// shared read-only by every body that points at it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Texture {
    pub(crate) name: String,
    pub(crate) base: [u8; 3],
    pub(crate) accent: [u8; 3],
    pub(crate) shadow: [u8; 3],
    pub(crate) bands: f32,
    pub(crate) seed: u32,
}

/// Immutable once loading finishes.
pub(crate) struct TextureSet {
    textures: Vec<Texture>,
    pub(crate) from_files: bool,
}

impl TextureSet {
    pub(crate) fn len(&self) -> usize {
        self.textures.len()
    }

    pub(crate) fn get(&self, index: usize) -> &Texture {
        &self.textures[index % self.textures.len()]
    }
}

/// Requests `planet1.json`, `planet2.json`, ... from `dir` until a request
/// fails; the first failure (missing file or bad JSON) ends the sequence
/// and the count of prior successes is final. No retry, no timeout — which
/// also means a genuine IO error is indistinguishable from "no more
/// textures" and truncates the set.
pub(crate) fn load_textures(dir: &Path) -> TextureSet {
    let mut textures = Vec::new();
    for n in 1.. {
        let path = dir.join(format!("planet{n}.json"));
        let Ok(data) = fs::read_to_string(&path) else {
            break;
        };
        match serde_json::from_str::<Texture>(&data) {
            Ok(t) => textures.push(t),
            Err(_) => break,
        }
    }

    if textures.is_empty() {
        return TextureSet {
            textures: builtin_textures(),
            from_files: false,
        };
    }
    TextureSet {
        textures,
        from_files: true,
    }
}

/// Fallback palettes so the toy runs without any texture files on disk.
fn builtin_textures() -> Vec<Texture> {
    fn t(name: &str, base: [u8; 3], accent: [u8; 3], shadow: [u8; 3], bands: f32, seed: u32) -> Texture {
        Texture {
            name: name.to_string(),
            base,
            accent,
            shadow,
            bands,
            seed,
        }
    }
    vec![
        t("Slate", [140, 140, 150], [220, 220, 235], [28, 28, 34], 0.1, 0xA1B2_C3D4),
        t("Amber", [235, 180, 90], [255, 235, 170], [60, 38, 16], 0.8, 0x1122_3344),
        t("Verdant", [65, 170, 90], [170, 220, 255], [10, 35, 55], 0.2, 0x1337_BEEF),
        t("Rust", [210, 70, 35], [255, 160, 90], [40, 15, 10], 0.15, 0xD0C0_B0A0),
        t("Banded", [190, 140, 95], [255, 220, 180], [40, 25, 18], 1.0, 0xCAFE_BABE),
        t("Glacial", [120, 200, 210], [200, 250, 245], [20, 40, 55], 0.3, 0x55AA_11EE),
        t("Abyss", [70, 120, 200], [160, 200, 255], [10, 20, 40], 0.25, 0x3C5A_9DFF),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    struct TempDir(PathBuf);

    impl TempDir {
        fn new(tag: &str) -> Self {
            let dir = std::env::temp_dir().join(format!(
                "solarium-test-{}-{}",
                tag,
                std::process::id()
            ));
            let _ = fs::remove_dir_all(&dir);
            fs::create_dir_all(&dir).unwrap();
            TempDir(dir)
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn write_texture(dir: &Path, n: usize) {
        let tex = Texture {
            name: format!("tex{n}"),
            base: [10, 20, 30],
            accent: [200, 210, 220],
            shadow: [1, 2, 3],
            bands: 0.5,
            seed: n as u32,
        };
        fs::write(
            dir.join(format!("planet{n}.json")),
            serde_json::to_vec(&tex).unwrap(),
        )
        .unwrap();
    }

    #[test]
    fn loader_stops_at_first_gap() {
        let tmp = TempDir::new("gap");
        write_texture(&tmp.0, 1);
        write_texture(&tmp.0, 2);
        // no planet3.json
        write_texture(&tmp.0, 4);

        let set = load_textures(&tmp.0);
        assert!(set.from_files);
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).name, "tex1");
        assert_eq!(set.get(1).name, "tex2");
    }

    #[test]
    fn loader_treats_parse_failure_as_end() {
        let tmp = TempDir::new("parse");
        write_texture(&tmp.0, 1);
        fs::write(tmp.0.join("planet2.json"), b"not json").unwrap();
        write_texture(&tmp.0, 3);

        let set = load_textures(&tmp.0);
        assert!(set.from_files);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn empty_directory_falls_back_to_builtin() {
        let tmp = TempDir::new("empty");
        let set = load_textures(&tmp.0);
        assert!(!set.from_files);
        assert!(set.len() > 0);
    }

    #[test]
    fn get_wraps_over_set_length() {
        let tmp = TempDir::new("wrap");
        write_texture(&tmp.0, 1);
        write_texture(&tmp.0, 2);
        let set = load_textures(&tmp.0);
        assert_eq!(set.get(5).name, set.get(1).name);
    }
}
