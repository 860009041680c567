//! Connected components on binary images.

use crate::{GrayImage, GrayImageView};

/// Union-find over provisional labels; union keeps the smaller root so
/// final labels follow raster order.
struct UnionFind {
    parent: Vec<u32>,
}

impl UnionFind {
    fn new() -> Self {
        Self { parent: Vec::new() }
    }

    fn make(&mut self) -> u32 {
        let id = self.parent.len() as u32;
        self.parent.push(id);
        id
    }

    fn find(&mut self, mut x: u32) -> u32 {
        while self.parent[x as usize] != x {
            let grandparent = self.parent[self.parent[x as usize] as usize];
            self.parent[x as usize] = grandparent;
            x = grandparent;
        }
        x
    }

    fn union(&mut self, a: u32, b: u32) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi as usize] = lo;
        }
    }
}

/// Two-pass 8-connectivity labeling of nonzero pixels.
///
/// Returns the label map (0 = background) and the number of labels
/// including the background.
pub fn label_components(src: &GrayImageView<'_>) -> (Vec<u32>, usize) {
    let w = src.width as i32;
    let h = src.height as i32;
    let mut labels = vec![0u32; src.width * src.height];
    let mut uf = UnionFind::new();
    uf.make(); // background stays label 0

    for y in 0..h {
        for x in 0..w {
            let idx = (y * w + x) as usize;
            if src.data[idx] == 0 {
                continue;
            }
            // Neighbors already visited in raster order.
            let mut current = 0u32;
            for (dx, dy) in [(-1, 0), (-1, -1), (0, -1), (1, -1)] {
                let nx = x + dx;
                let ny = y + dy;
                if nx < 0 || ny < 0 || nx >= w {
                    continue;
                }
                let nl = labels[(ny * w + nx) as usize];
                if nl == 0 {
                    continue;
                }
                if current == 0 {
                    current = nl;
                } else if nl != current {
                    uf.union(current, nl);
                }
            }
            if current == 0 {
                current = uf.make();
            }
            labels[idx] = current;
        }
    }

    // Resolve equivalences and compact to 0..count.
    let mut remap = vec![0u32; uf.parent.len()];
    let mut count = 0u32;
    for i in 0..uf.parent.len() as u32 {
        if uf.find(i) == i {
            remap[i as usize] = count;
            count += 1;
        }
    }
    for label in &mut labels {
        let root = uf.find(*label);
        *label = remap[root as usize];
    }
    (labels, count as usize)
}

/// Keep only the `keep` largest nonzero components by pixel count;
/// everything else becomes black. Area ties keep the earlier component.
pub fn keep_largest_components(src: &GrayImageView<'_>, keep: usize) -> GrayImage {
    let (labels, count) = label_components(src);
    let mut out = GrayImage::zeros(src.width, src.height);
    if count <= 1 {
        return out;
    }

    let mut areas = vec![0usize; count];
    for &l in &labels {
        areas[l as usize] += 1;
    }

    let mut order: Vec<usize> = (1..count).collect();
    order.sort_by(|&a, &b| areas[b].cmp(&areas[a]).then(a.cmp(&b)));

    let mut selected = vec![false; count];
    for &l in order.iter().take(keep) {
        selected[l] = true;
    }

    for (dst, &l) in out.data.iter_mut().zip(labels.iter()) {
        if selected[l as usize] {
            *dst = 255;
        }
    }
    out
}
