#[cfg(target_arch = "wasm32")]
fn main() {
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(err) = native::run() {
        eprintln!("vase_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fmt::{self, Write as _};
    use std::fs::OpenOptions;
    use std::io::{self, Write as _};
    use std::path::{Path, PathBuf};

    use vase_engine::geom::{
        AssembleOptions, PARAMETER_RANGES, PathStrategy, ShapeParameters, VaseMesh,
        VaseMeshDiagnostics, assemble_with_options,
    };

    /// Snapshot floats are rounded to this many decimals.
    const SNAPSHOT_DECIMALS: i32 = 6;

    const USAGE: &str = r#"vase_cli (vase-engine)

USAGE:
  vase_cli list
  vase_cli ranges
  vase_cli params <preset>
  vase_cli run <preset|all> [options]

PRESETS:
  artistic_default
  spiral_vase
  spiral_vase_smooth
  simple_helix

OPTIONS (run):
  --params <file>            JSON object overriding preset parameters (camelCase keys)
  --out-dir <dir>            Write <preset>.snap into this dir (required for `all`)
  --snap <path>              Write the snapshot here instead of stdout (single preset only)
  --connect-terminal-ring    Also triangulate the last ring of every strand
  --no-cap                   Skip the base cap
  --overwrite                Replace existing snapshot files
  -h, --help                 Show this help
"#;

    pub fn run() -> Result<(), String> {
        let mut args = std::env::args().skip(1);

        match args.next().as_deref() {
            None | Some("-h" | "--help" | "help") => println!("{USAGE}"),
            Some("list") => Preset::ALL.iter().for_each(|p| println!("{}", p.name())),
            Some("ranges") => println!("{}", to_json(&PARAMETER_RANGES)?),
            Some("params") => {
                let preset = Preset::parse(args.next().as_deref())?;
                println!("{}", to_json(&preset.parameters())?);
            }
            Some("run") => {
                let target = args.next().ok_or("missing preset name")?;
                RunRequest::parse(&target, args)?.execute()?;
            }
            Some(other) => return Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
        Ok(())
    }

    fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
        serde_json::to_string_pretty(value).map_err(|e| e.to_string())
    }

    enum Destination {
        Stdout,
        File(PathBuf),
        Dir(PathBuf),
    }

    struct RunRequest {
        presets: Vec<Preset>,
        params_file: Option<PathBuf>,
        destination: Destination,
        options: AssembleOptions,
        overwrite: bool,
    }

    impl RunRequest {
        fn parse(target: &str, mut args: impl Iterator<Item = String>) -> Result<Self, String> {
            let mut params_file = None;
            let mut out_dir = None;
            let mut snap = None;
            let mut options = AssembleOptions::default();
            let mut overwrite = false;

            while let Some(flag) = args.next() {
                let mut path_arg = || {
                    args.next()
                        .map(PathBuf::from)
                        .ok_or_else(|| format!("{flag} expects a path"))
                };
                match flag.as_str() {
                    "--params" => params_file = Some(path_arg()?),
                    "--out-dir" => out_dir = Some(path_arg()?),
                    "--snap" => snap = Some(path_arg()?),
                    "--connect-terminal-ring" => options.connect_terminal_ring = true,
                    "--no-cap" => options.base_cap = false,
                    "--overwrite" => overwrite = true,
                    other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
                }
            }

            let presets = if target == "all" {
                if params_file.is_some() {
                    return Err("--params applies to a single preset only".to_string());
                }
                Preset::ALL.to_vec()
            } else {
                vec![Preset::parse(Some(target))?]
            };

            let destination = match (out_dir, snap) {
                (Some(_), Some(_)) => return Err("use either --out-dir or --snap".to_string()),
                (Some(dir), None) => Destination::Dir(dir),
                (None, _) if presets.len() > 1 => {
                    return Err("`run all` requires --out-dir".to_string());
                }
                (None, Some(path)) => Destination::File(path),
                (None, None) => Destination::Stdout,
            };

            Ok(Self { presets, params_file, destination, options, overwrite })
        }

        fn execute(&self) -> Result<(), String> {
            if let Destination::Dir(dir) = &self.destination {
                std::fs::create_dir_all(dir)
                    .map_err(|e| format!("create {}: {e}", dir.display()))?;
            }

            for &preset in &self.presets {
                let params = preset.with_overrides(self.params_file.as_deref())?;
                let (mesh, diag) =
                    assemble_with_options(&params, self.options).map_err(|e| e.to_string())?;
                mesh.validate()
                    .map_err(|e| format!("{}: invalid mesh: {e}", preset.name()))?;

                let text = snapshot(preset, &params, &mesh, &diag).map_err(|e| e.to_string())?;
                match &self.destination {
                    Destination::Stdout => print!("{text}"),
                    Destination::File(path) => self.save(path, &text)?,
                    Destination::Dir(dir) => {
                        self.save(&dir.join(format!("{}.snap", preset.name())), &text)?;
                    }
                }

                eprintln!("{}: {}", preset.name(), diag.summary());
                if let Some(timing) = &diag.timing {
                    eprintln!("  timing: {:.3} ms", timing.total_ms());
                }
            }
            Ok(())
        }

        fn save(&self, path: &Path, text: &str) -> Result<(), String> {
            let mut file = OpenOptions::new()
                .write(true)
                .truncate(true)
                .create(true)
                .create_new(!self.overwrite)
                .open(path)
                .map_err(|e| match e.kind() {
                    io::ErrorKind::AlreadyExists => {
                        format!("{} exists (pass --overwrite)", path.display())
                    }
                    _ => format!("open {}: {e}", path.display()),
                })?;
            file.write_all(text.as_bytes())
                .map_err(|e| format!("write {}: {e}", path.display()))?;
            eprintln!("wrote {}", path.display());
            Ok(())
        }
    }

    /// Rounds to [`SNAPSHOT_DECIMALS`] and folds `-0` into `0`.
    fn rounded(value: f64) -> f64 {
        let scale = 10f64.powi(SNAPSHOT_DECIMALS);
        (value * scale).round() / scale + 0.0
    }

    fn write_triples(out: &mut String, tag: &str, values: &[f64]) -> fmt::Result {
        let decimals = SNAPSHOT_DECIMALS as usize;
        for v in values.chunks_exact(3) {
            let [x, y, z] = [rounded(v[0]), rounded(v[1]), rounded(v[2])];
            writeln!(out, "{tag} {x:.decimals$} {y:.decimals$} {z:.decimals$}")?;
        }
        Ok(())
    }

    /// Line-oriented text dump of one generated mesh, stable across runs.
    fn snapshot(
        preset: Preset,
        params: &ShapeParameters,
        mesh: &VaseMesh,
        diag: &VaseMeshDiagnostics,
    ) -> Result<String, Box<dyn std::error::Error>> {
        let mut out = String::new();
        writeln!(out, "# vase-engine snapshot v1")?;
        writeln!(out, "preset {}", preset.name())?;
        writeln!(out, "params {}", serde_json::to_string(params)?)?;
        writeln!(out, "summary {}", diag.summary())?;
        writeln!(
            out,
            "layout strands={} rings={} points={} cap_triangles={}",
            diag.strand_count,
            diag.rings_per_strand,
            diag.points_per_profile,
            diag.cap_triangle_count
        )?;

        writeln!(out, "positions {}", mesh.vertex_count())?;
        write_triples(&mut out, "p", &mesh.positions)?;
        writeln!(out, "normals {}", mesh.normals.len() / 3)?;
        write_triples(&mut out, "n", &mesh.normals)?;
        writeln!(out, "triangles {}", mesh.triangle_count())?;
        for tri in mesh.indices.chunks_exact(3) {
            writeln!(out, "t {} {} {}", tri[0], tri[1], tri[2])?;
        }
        Ok(out)
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Preset {
        ArtisticDefault,
        SpiralVase,
        SpiralVaseSmooth,
        SimpleHelix,
    }

    impl Preset {
        const ALL: &'static [Preset] = &[
            Preset::ArtisticDefault,
            Preset::SpiralVase,
            Preset::SpiralVaseSmooth,
            Preset::SimpleHelix,
        ];

        fn name(self) -> &'static str {
            match self {
                Preset::ArtisticDefault => "artistic_default",
                Preset::SpiralVase => "spiral_vase",
                Preset::SpiralVaseSmooth => "spiral_vase_smooth",
                Preset::SimpleHelix => "simple_helix",
            }
        }

        fn parse(name: Option<&str>) -> Result<Self, String> {
            let name = name.ok_or("missing preset name")?;
            Self::ALL.iter().copied().find(|p| p.name() == name).ok_or_else(|| {
                let known: Vec<_> = Self::ALL.iter().map(|p| p.name()).collect();
                format!("unknown preset `{name}` (known: {})", known.join(", "))
            })
        }

        fn parameters(self) -> ShapeParameters {
            let mut params = ShapeParameters::default();
            match self {
                Preset::ArtisticDefault => {}
                Preset::SpiralVase => {
                    params.vase_mode = true;
                    params.apply_vase_presets();
                }
                Preset::SpiralVaseSmooth => {
                    params.vase_mode = true;
                    params.smooth_spiral = true;
                    params.apply_vase_presets();
                }
                Preset::SimpleHelix => {
                    params.path_strategy = PathStrategy::SimpleHelix;
                    params.num_paths = 6;
                    params.twist_rate = 1.0;
                }
            }
            params
        }

        /// Preset parameters with the keys of a JSON object file laid over them.
        fn with_overrides(self, file: Option<&Path>) -> Result<ShapeParameters, String> {
            let base = self.parameters();
            let Some(file) = file else {
                return Ok(base);
            };

            let text = std::fs::read_to_string(file)
                .map_err(|e| format!("read {}: {e}", file.display()))?;
            let parsed = serde_json::from_str::<serde_json::Value>(&text)
                .map_err(|e| format!("parse {}: {e}", file.display()))?;
            let serde_json::Value::Object(overrides) = parsed else {
                return Err(format!("{} must contain a JSON object", file.display()));
            };

            let mut merged = serde_json::to_value(&base).map_err(|e| e.to_string())?;
            if let serde_json::Value::Object(fields) = &mut merged {
                fields.extend(overrides);
            }
            let mut params: ShapeParameters =
                serde_json::from_value(merged).map_err(|e| format!("parameters: {e}"))?;
            if params.vase_mode {
                params.apply_vase_presets();
            }
            Ok(params)
        }
    }
}
