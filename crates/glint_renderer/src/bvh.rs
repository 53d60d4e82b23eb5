//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over the scene's primitives. Leaves refer to primitives by
//! index into the scene-owned slice; internal nodes own their children, so
//! dropping the root frees the whole tree.

use rand::{Rng, RngCore};

use crate::error::{SceneError, SceneResult};
use crate::hittable::{HitRecord, Primitive};
use crate::Ray;
use glint_math::{Aabb, Interval};

/// BVH node - either a branch with two children or a leaf with primitives.
#[derive(Debug)]
pub enum BvhNode {
    /// Internal node with two owned subtrees.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// One or two primitives by index. A single primitive is stored in both
    /// slots.
    Leaf {
        left: usize,
        right: usize,
        bbox: Aabb,
    },
    /// Tree over zero primitives.
    Empty,
}

/// A built hierarchy plus the number of primitives it was built over.
#[derive(Debug)]
pub struct Bvh {
    root: BvhNode,
    primitive_count: usize,
}

impl Bvh {
    /// Build a BVH over `primitives`.
    ///
    /// Each level sorts its range by bounding-box minimum along a randomly
    /// chosen axis and splits at the midpoint. Fails if any primitive has
    /// no bounding box over `time`.
    pub fn build(
        primitives: &[Primitive],
        time: Interval,
        rng: &mut dyn RngCore,
    ) -> SceneResult<Self> {
        let boxes = primitives
            .iter()
            .enumerate()
            .map(|(index, primitive)| {
                primitive
                    .bounding_box(time)
                    .ok_or(SceneError::MissingBoundingBox { index })
            })
            .collect::<SceneResult<Vec<Aabb>>>()?;

        let root = if boxes.is_empty() {
            BvhNode::Empty
        } else {
            let mut indices: Vec<usize> = (0..boxes.len()).collect();
            BvhNode::build(&mut indices, &boxes, rng)
        };

        let bvh = Self {
            root,
            primitive_count: primitives.len(),
        };
        log::debug!(
            "Built BVH over {} primitives ({} nodes, depth {})",
            bvh.primitive_count,
            bvh.root.node_count(),
            bvh.root.depth()
        );
        Ok(bvh)
    }

    /// Nearest hit. `primitives` must be the slice the tree was built over.
    pub fn hit<'a>(
        &self,
        primitives: &'a [Primitive],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<HitRecord<'a>> {
        debug_assert_eq!(primitives.len(), self.primitive_count);
        self.root.hit(primitives, ray, ray_t)
    }

    pub fn root(&self) -> &BvhNode {
        &self.root
    }

    pub fn bounding_box(&self) -> Aabb {
        self.root.bounding_box()
    }

    pub fn primitive_count(&self) -> usize {
        self.primitive_count
    }
}

impl BvhNode {
    /// Recursive construction over a non-empty index range.
    fn build(indices: &mut [usize], boxes: &[Aabb], rng: &mut dyn RngCore) -> Self {
        let axis = rng.gen_range(0..3);

        // Stable: equal keys keep their insertion order
        indices.sort_by(|&a, &b| {
            let a_min = boxes[a].axis_interval(axis).min;
            let b_min = boxes[b].axis_interval(axis).min;
            a_min.total_cmp(&b_min)
        });

        match indices.len() {
            1 => BvhNode::Leaf {
                left: indices[0],
                right: indices[0],
                bbox: boxes[indices[0]],
            },
            2 => BvhNode::Leaf {
                left: indices[0],
                right: indices[1],
                bbox: Aabb::surrounding(&boxes[indices[0]], &boxes[indices[1]]),
            },
            _ => {
                let mid = indices.len() / 2;
                let (left_indices, right_indices) = indices.split_at_mut(mid);
                let left = Self::build(left_indices, boxes, rng);
                let right = Self::build(right_indices, boxes, rng);
                let bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());

                BvhNode::Branch {
                    left: Box::new(left),
                    right: Box::new(right),
                    bbox,
                }
            }
        }
    }

    /// Depth-first nearest-hit search. Both children are always queried
    /// with the full interval and the smaller `t` wins.
    fn hit<'a>(
        &self,
        primitives: &'a [Primitive],
        ray: &Ray,
        ray_t: Interval,
    ) -> Option<HitRecord<'a>> {
        match self {
            BvhNode::Empty => None,

            BvhNode::Leaf { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = primitives[*left].hit(ray, ray_t);
                if left == right {
                    return hit_left;
                }
                let hit_right = primitives[*right].hit(ray, ray_t);
                nearer(hit_left, hit_right)
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(primitives, ray, ray_t);
                let hit_right = right.hit(primitives, ray, ray_t);
                nearer(hit_left, hit_right)
            }
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    fn node_count(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.node_count() + right.node_count(),
        }
    }

    fn depth(&self) -> usize {
        match self {
            BvhNode::Empty => 0,
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}

#[inline]
fn nearer<'a>(a: Option<HitRecord<'a>>, b: Option<HitRecord<'a>>) -> Option<HitRecord<'a>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(if b.t < a.t { b } else { a }),
        (a, None) => a,
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hittable::hit_linear;
    use crate::sampling::gen_range;
    use crate::{Color, Lambertian, Sphere};
    use glint_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const RAY_T: Interval = Interval::new(0.001, f32::INFINITY);

    fn sphere(center: Vec3, radius: f32) -> Primitive {
        Sphere::new(center, radius, Lambertian::new(Color::new(0.5, 0.5, 0.5))).into()
    }

    fn random_scene(count: usize, rng: &mut StdRng) -> Vec<Primitive> {
        (0..count)
            .map(|_| {
                let center = Vec3::new(
                    gen_range(rng, -20.0, 20.0),
                    gen_range(rng, -20.0, 20.0),
                    gen_range(rng, -20.0, 20.0),
                );
                sphere(center, gen_range(rng, 0.2, 3.0))
            })
            .collect()
    }

    #[test]
    fn test_bvh_empty() {
        let mut rng = StdRng::seed_from_u64(0);
        let bvh = Bvh::build(&[], Interval::new(0.0, 1.0), &mut rng).unwrap();
        assert!(matches!(bvh.root(), BvhNode::Empty));

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        assert!(bvh.hit(&[], &ray, RAY_T).is_none());
    }

    #[test]
    fn test_bvh_single_sphere_aliases_leaf() {
        let mut rng = StdRng::seed_from_u64(1);
        let primitives = vec![sphere(Vec3::new(0.0, 0.0, -1.0), 0.5)];
        let bvh = Bvh::build(&primitives, Interval::new(0.0, 1.0), &mut rng).unwrap();

        assert!(matches!(bvh.root(), BvhNode::Leaf { left: 0, right: 0, .. }));

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = bvh.hit(&primitives, &ray, RAY_T).unwrap();
        assert!((rec.t - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_bvh_two_spheres_share_one_leaf() {
        let mut rng = StdRng::seed_from_u64(2);
        let primitives = vec![
            sphere(Vec3::new(0.0, 0.0, -5.0), 0.5),
            sphere(Vec3::new(0.0, 0.0, -2.0), 0.5),
        ];
        let bvh = Bvh::build(&primitives, Interval::new(0.0, 1.0), &mut rng).unwrap();
        assert!(matches!(bvh.root(), BvhNode::Leaf { .. }));

        let ray = Ray::new_simple(Vec3::ZERO, -Vec3::Z);
        let rec = bvh.hit(&primitives, &ray, RAY_T).unwrap();
        assert!((rec.t - 1.5).abs() < 1e-5);
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let mut rng = StdRng::seed_from_u64(3);
        let primitives: Vec<Primitive> = (0..10)
            .map(|i| sphere(Vec3::new(i as f32, 0.0, -5.0), 0.5))
            .collect();
        let bvh = Bvh::build(&primitives, Interval::new(0.0, 1.0), &mut rng).unwrap();
        assert!(matches!(bvh.root(), BvhNode::Branch { .. }));

        // Ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let rec = bvh.hit(&primitives, &ray, RAY_T).unwrap();

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((rec.p.z - (-4.5)).abs() < 0.01);
    }

    #[test]
    fn test_bvh_root_box_covers_all_primitives() {
        let mut rng = StdRng::seed_from_u64(4);
        let primitives = random_scene(57, &mut rng);
        let bvh = Bvh::build(&primitives, Interval::new(0.0, 1.0), &mut rng).unwrap();

        let root_box = bvh.bounding_box();
        for primitive in &primitives {
            let bbox = primitive.bounding_box(Interval::new(0.0, 1.0)).unwrap();
            assert!(root_box.encloses(&bbox));
        }
    }

    #[test]
    fn test_bvh_matches_linear_scan() {
        let mut rng = StdRng::seed_from_u64(5);

        for scene_size in [1, 2, 3, 7, 64, 200] {
            let primitives = random_scene(scene_size, &mut rng);
            let bvh = Bvh::build(&primitives, Interval::new(0.0, 1.0), &mut rng).unwrap();

            for _ in 0..300 {
                let origin = Vec3::new(
                    gen_range(&mut rng, -30.0, 30.0),
                    gen_range(&mut rng, -30.0, 30.0),
                    gen_range(&mut rng, -30.0, 30.0),
                );
                let target = Vec3::new(
                    gen_range(&mut rng, -20.0, 20.0),
                    gen_range(&mut rng, -20.0, 20.0),
                    gen_range(&mut rng, -20.0, 20.0),
                );
                let ray = Ray::new_simple(origin, target - origin);

                let fast = bvh.hit(&primitives, &ray, RAY_T);
                let slow = hit_linear(&primitives, &ray, RAY_T);
                match (fast, slow) {
                    (Some(f), Some(s)) => assert!(
                        (f.t - s.t).abs() <= 1e-5 * s.t.max(1.0),
                        "bvh t={} linear t={}",
                        f.t,
                        s.t
                    ),
                    (None, None) => {}
                    (f, s) => panic!(
                        "bvh and linear scan disagree: {:?} vs {:?}",
                        f.map(|r| r.t),
                        s.map(|r| r.t)
                    ),
                }
            }
        }
    }

    #[test]
    fn test_bvh_missing_bounding_box_is_an_error() {
        let mut rng = StdRng::seed_from_u64(6);
        let primitives = vec![
            sphere(Vec3::ZERO, 1.0),
            sphere(Vec3::new(f32::NAN, 0.0, 0.0), 1.0),
            sphere(Vec3::ONE, 1.0),
        ];

        let err = Bvh::build(&primitives, Interval::new(0.0, 1.0), &mut rng).unwrap_err();
        assert_eq!(err, SceneError::MissingBoundingBox { index: 1 });
    }
}
