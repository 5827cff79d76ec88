//! Triangle-only OBJ parser supporting positions, normals and texture coordinates.
//!
//! Grammar accepted per line (after trimming):
//! - `# ...` comment, blank line: skipped
//! - `v x y z`, `vt u v`, `vn x y z`: appended to their pool
//! - `f p/t/n p/t/n p/t/n`: one triangle, 1-based indices
//! - anything else: ignored
//!
//! Numbers use `.` as the decimal point whatever the host locale is.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{
    error::{AssetError, AssetResult, FaceDefect},
    mesh::{FaceIndexTriple, Mesh, Normal, Position, TexCoord, VertexRef},
};

/// Load an OBJ mesh from a file path.
pub fn load_obj_from_path(path: impl AsRef<Path>) -> AssetResult<Mesh> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AssetError::FileNotFound {
        path: path.to_path_buf(),
        source,
    })?;
    log::info!("Loading OBJ from {:?}", path);
    parse_obj(BufReader::new(file), path)
}

/// Load an OBJ mesh from a [`BufRead`] implementation.
pub fn load_obj_from_reader<R: BufRead>(reader: R) -> AssetResult<Mesh> {
    parse_obj(reader, Path::new("<reader>"))
}

/// Convenience helper to parse an OBJ string literal.
pub fn load_obj_from_str(contents: &str) -> AssetResult<Mesh> {
    parse_obj(io::Cursor::new(contents), Path::new("<string>"))
}

fn parse_obj<R: BufRead>(reader: R, origin: &Path) -> AssetResult<Mesh> {
    let mut parser = ObjParser::default();
    for (line_no, line) in reader.lines().enumerate() {
        line.map_err(|source| AssetError::FileNotFound {
            path: origin.to_path_buf(),
            source,
        })
        .and_then(|line| parser.feed_line(line_no + 1, &line))
        .inspect_err(|err| log::warn!("Failed to parse OBJ {:?}: {}", origin, err))?;
    }
    let mesh = parser.finish();
    log::info!(
        "Parsed OBJ: {} positions, {} texcoords, {} normals, {} faces",
        mesh.positions().len(),
        mesh.texcoords().len(),
        mesh.normals().len(),
        mesh.face_count()
    );
    Ok(mesh)
}

/// What a single line of OBJ text declares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LineKind {
    Blank,
    Comment,
    Position,
    TexCoord,
    Normal,
    Face,
    Unknown,
}

/// A classified line: its kind, leading keyword and remaining tokens.
#[derive(Clone, Debug)]
pub struct LineRecord<'a> {
    pub kind: LineKind,
    pub keyword: &'a str,
    pub args: Tokens<'a>,
}

/// Classify one line of OBJ text.
pub fn classify_line(line: &str) -> LineRecord<'_> {
    let trimmed = line.trim();
    let mut tokens = tokenize(trimmed);
    let Some(keyword) = tokens.next() else {
        return LineRecord {
            kind: LineKind::Blank,
            keyword: "",
            args: tokens,
        };
    };

    let kind = if trimmed.starts_with('#') {
        LineKind::Comment
    } else {
        match keyword {
            "v" => LineKind::Position,
            "vt" => LineKind::TexCoord,
            "vn" => LineKind::Normal,
            "f" => LineKind::Face,
            _ => LineKind::Unknown,
        }
    };

    LineRecord {
        kind,
        keyword,
        args: tokens,
    }
}

/// Split on runs of whitespace, ignoring leading and trailing whitespace.
pub fn tokenize(line: &str) -> Tokens<'_> {
    Tokens { rest: line }
}

/// Iterator over the whitespace-separated tokens of a line.
#[derive(Clone, Debug)]
pub struct Tokens<'a> {
    rest: &'a str,
}

impl<'a> Iterator for Tokens<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let start = self.rest.find(|c: char| !c.is_whitespace())?;
        let rest = &self.rest[start..];
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (token, tail) = rest.split_at(end);
        self.rest = tail;
        Some(token)
    }
}

/// Line-by-line accumulator behind the `load_obj_*` functions.
#[derive(Debug, Default)]
pub struct ObjParser {
    positions: Vec<Position>,
    texcoords: Vec<TexCoord>,
    normals: Vec<Normal>,
    faces: Vec<FaceIndexTriple>,
}

impl ObjParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one line; `line_no` is 1-based and only used in errors.
    pub fn feed_line(&mut self, line_no: usize, line: &str) -> AssetResult<()> {
        let LineRecord {
            kind,
            keyword,
            mut args,
        } = classify_line(line);

        match kind {
            LineKind::Blank | LineKind::Comment => {}
            LineKind::Position => {
                let x = parse_f32(args.next(), line_no, "x coordinate")?;
                let y = parse_f32(args.next(), line_no, "y coordinate")?;
                let z = parse_f32(args.next(), line_no, "z coordinate")?;
                self.positions.push([x, y, z]);
            }
            LineKind::TexCoord => {
                let u = parse_f32(args.next(), line_no, "u coordinate")?;
                let v = parse_f32(args.next(), line_no, "v coordinate")?;
                self.texcoords.push([u, v]);
            }
            LineKind::Normal => {
                let nx = parse_f32(args.next(), line_no, "nx coordinate")?;
                let ny = parse_f32(args.next(), line_no, "ny coordinate")?;
                let nz = parse_f32(args.next(), line_no, "nz coordinate")?;
                self.normals.push([nx, ny, nz]);
            }
            LineKind::Face => {
                let face = parse_face(args, line_no)?;
                self.faces.push(face);
            }
            LineKind::Unknown => {
                // o/g/s/usemtl/mtllib and friends
                log::debug!("Ignoring '{}' on line {}", keyword, line_no);
            }
        }
        Ok(())
    }

    pub fn finish(self) -> Mesh {
        Mesh::new(self.positions, self.texcoords, self.normals, self.faces)
    }
}

fn parse_f32(value: Option<&str>, line_no: usize, what: &'static str) -> AssetResult<f32> {
    let token = value.ok_or_else(|| AssetError::missing_number(line_no, what))?;
    // Rust also accepts `inf`/`nan`; coordinates must be finite decimals.
    token
        .parse::<f32>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| AssetError::bad_number(line_no, what, token))
}

fn parse_face(args: Tokens<'_>, line_no: usize) -> AssetResult<FaceIndexTriple> {
    let malformed = |defect: FaceDefect| AssetError::MalformedFace {
        line: line_no,
        defect,
    };

    let tokens: Vec<&str> = args.collect();
    let [a, b, c] = tokens[..] else {
        return Err(malformed(FaceDefect::VertexCount(tokens.len())));
    };

    let mut corners = [VertexRef::default(); 3];
    for (corner, token) in corners.iter_mut().zip([a, b, c]) {
        *corner = parse_face_vertex(token).map_err(malformed)?;
    }
    Ok(FaceIndexTriple(corners))
}

fn parse_face_vertex(token: &str) -> Result<VertexRef, FaceDefect> {
    let components: Vec<&str> = token.split('/').collect();
    let [p, t, n] = components[..] else {
        return Err(FaceDefect::ComponentCount {
            token: token.to_string(),
            found: components.len(),
        });
    };
    Ok(VertexRef::new(
        resolve_index(p, token)?,
        resolve_index(t, token)?,
        resolve_index(n, token)?,
    ))
}

/// Convert a 1-based index component to 0-based.
fn resolve_index(component: &str, token: &str) -> Result<usize, FaceDefect> {
    let raw = component
        .parse::<usize>()
        .map_err(|_| FaceDefect::InvalidIndex {
            token: token.to_string(),
            component: component.to_string(),
        })?;
    raw.checked_sub(1).ok_or_else(|| FaceDefect::ZeroIndex {
        token: token.to_string(),
    })
}
