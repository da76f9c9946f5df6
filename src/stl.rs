use crate::geo::*;
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use std::{
    fs::File,
    io::{BufRead, BufReader, Cursor, Read},
    path::Path,
};
use thiserror::Error;

const HEADER_SIZE: usize = 80;

#[derive(Error, Debug)]
/// Error types for loading STL files
pub enum StlError {
    #[error("Couldn't read STL file")]
    IO(#[from] std::io::Error),
    #[error("Couldn't read STL header")]
    Header,
    #[error("STL file ended after {got} of {expected} triangles")]
    Truncated { expected: u32, got: u32 },
    #[error("Invalid number in ASCII STL at line {0}")]
    Parse(usize),
    #[error("STL file contains no triangles")]
    Empty,
}

pub struct Triangle {
    pub normal: [f32; 3],
    pub v1: [f32; 3],
    pub v2: [f32; 3],
    pub v3: [f32; 3],
    pub attr_byte_count: u16,
}

impl Triangle {
    pub fn new(v1: [f32; 3], v2: [f32; 3], v3: [f32; 3]) -> Triangle {
        Triangle {
            normal: [0., 0., 0.],
            v1,
            v2,
            v3,
            attr_byte_count: 0,
        }
    }
}

fn point_eq(lhs: [f32; 3], rhs: [f32; 3]) -> bool {
    lhs[0] == rhs[0] && lhs[1] == rhs[1] && lhs[2] == rhs[2]
}

impl PartialEq for Triangle {
    fn eq(&self, rhs: &Triangle) -> bool {
        point_eq(self.normal, rhs.normal)
            && point_eq(self.v1, rhs.v1)
            && point_eq(self.v2, rhs.v2)
            && point_eq(self.v3, rhs.v3)
            && self.attr_byte_count == rhs.attr_byte_count
    }
}

impl Eq for Triangle {}

pub struct BinaryStlHeader {
    pub header: [u8; HEADER_SIZE],
    pub num_triangles: u32,
}

impl BinaryStlHeader {
    pub fn new(num_triangles: u32) -> BinaryStlHeader {
        BinaryStlHeader {
            header: [0_u8; HEADER_SIZE],
            num_triangles,
        }
    }
}

pub struct BinaryStlFile {
    pub header: BinaryStlHeader,
    pub triangles: Vec<Triangle>,
}

impl BinaryStlFile {
    pub fn new(triangles: Vec<Triangle>) -> BinaryStlFile {
        let header = BinaryStlHeader::new(triangles.len() as u32);
        BinaryStlFile { header, triangles }
    }

    pub fn to_bytes<T: WriteBytesExt>(&self, out: &mut T) -> std::io::Result<()> {
        assert_eq!(self.header.num_triangles as usize, self.triangles.len());

        // write the header.
        out.write_all(&self.header.header)?;
        out.write_u32::<LittleEndian>(self.header.num_triangles)?;

        // write all the triangles
        for t in &self.triangles {
            write_point(out, t.normal)?;
            write_point(out, t.v1)?;
            write_point(out, t.v2)?;
            write_point(out, t.v3)?;
            out.write_u16::<LittleEndian>(t.attr_byte_count)?;
        }

        Ok(())
    }
}

fn read_point<T: ReadBytesExt>(input: &mut T) -> std::io::Result<[f32; 3]> {
    let x1 = input.read_f32::<LittleEndian>()?;
    let x2 = input.read_f32::<LittleEndian>()?;
    let x3 = input.read_f32::<LittleEndian>()?;

    Ok([x1, x2, x3])
}

fn read_triangle<T: ReadBytesExt>(input: &mut T) -> std::io::Result<Triangle> {
    let normal = read_point(input)?;
    let v1 = read_point(input)?;
    let v2 = read_point(input)?;
    let v3 = read_point(input)?;
    let attr_count = input.read_u16::<LittleEndian>()?;

    Ok(Triangle {
        normal,
        v1,
        v2,
        v3,
        attr_byte_count: attr_count,
    })
}

fn read_header<T: ReadBytesExt>(input: &mut T) -> Result<BinaryStlHeader, StlError> {
    let mut header = [0u8; HEADER_SIZE];
    input.read_exact(&mut header).map_err(|_| StlError::Header)?;
    let num_triangles = input.read_u32::<LittleEndian>().map_err(|_| StlError::Header)?;

    Ok(BinaryStlHeader {
        header,
        num_triangles,
    })
}

/// Read a binary STL body, header included
pub fn read_stl<T: ReadBytesExt>(input: &mut T) -> Result<BinaryStlFile, StlError> {
    let header = read_header(input)?;

    let mut triangles = Vec::new();
    for i in 0..header.num_triangles {
        match read_triangle(input) {
            Ok(tri) => triangles.push(tri),
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(StlError::Truncated {
                    expected: header.num_triangles,
                    got: i,
                })
            },
            Err(e) => return Err(e.into()),
        }
    }

    Ok(BinaryStlFile { header, triangles })
}

/// Read an ASCII STL, only the vertex lines are used, normals are ignored
pub fn read_stl_ascii<T: BufRead>(input: T) -> Result<Vec<Triangle>, StlError> {
    let mut triangles = Vec::new();
    let mut vertices: Vec<[f32; 3]> = Vec::with_capacity(3);

    for (line_num, line) in input.lines().enumerate() {
        let line = line?;
        let mut parts = line.split_whitespace();
        match parts.next().map(|x| x.to_ascii_lowercase()).as_deref() {
            Some("outer") => vertices.clear(),
            Some("vertex") => {
                let mut point = [0_f32; 3];
                for value in point.iter_mut() {
                    *value = parts
                        .next()
                        .and_then(|x| x.parse::<f32>().ok())
                        .ok_or(StlError::Parse(line_num + 1))?;
                }
                vertices.push(point);
            },
            Some("endfacet") => {
                if vertices.len() == 3 {
                    triangles.push(Triangle::new(vertices[0], vertices[1], vertices[2]));
                }
                vertices.clear();
            },
            Some("endsolid") => break,
            _ => {},
        }
    }

    Ok(triangles)
}

/// ASCII files start with "solid", but so do some binary headers. Binary
/// headers usually carry NUL padding, which never shows up in text.
fn is_ascii(data: &[u8]) -> bool {
    let start = data.iter().position(|x| !x.is_ascii_whitespace()).unwrap_or(data.len());
    data[start..].starts_with(b"solid") && !data[..data.len().min(HEADER_SIZE)].contains(&0)
}

/// Parse STL data, detecting ASCII or binary encoding
pub fn parse_stl(data: &[u8]) -> Result<Vec<Triangle3d>, StlError> {
    let triangles = if is_ascii(data) {
        debug!("parsing ascii stl");
        read_stl_ascii(Cursor::new(data))?
    } else {
        debug!("parsing binary stl");
        read_stl(&mut Cursor::new(data))?.triangles
    };
    if triangles.is_empty() {
        return Err(StlError::Empty);
    }
    Ok(to_triangles3d(&triangles))
}

/// Load an STL file into triangles
pub fn stl_to_tri<P: AsRef<Path>>(filename: P) -> Result<Vec<Triangle3d>, StlError> {
    let file = File::open(filename)?;
    let mut data = Vec::new();
    BufReader::new(file).read_to_end(&mut data)?;
    parse_stl(&data)
}

fn write_point<T: WriteBytesExt>(out: &mut T, p: [f32; 3]) -> std::io::Result<()> {
    for x in &p {
        out.write_f32::<LittleEndian>(*x)?;
    }
    Ok(())
}

pub fn to_triangles3d(triangles: &[Triangle]) -> Vec<Triangle3d> {
    triangles
        .iter()
        .map(|x| Triangle3d {
            p1: x.v1.into(),
            p2: x.v2.into(),
            p3: x.v3.into(),
        })
        .collect()
}

pub fn from_triangles3d(tris: &[Triangle3d]) -> BinaryStlFile {
    let triangles: Vec<_> = tris
        .iter()
        .map(|tri| Triangle::new(tri.p1.into(), tri.p2.into(), tri.p3.into()))
        .collect();
    BinaryStlFile::new(triangles)
}
