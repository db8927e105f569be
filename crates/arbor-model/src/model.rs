//! Model assembly and finalization.

use crate::{Body, BodyIndex, Joint, JointIndex, JointKind, ModelError, Result};
use arbor_math::{
    check_rotation_matrix, check_unit_vector, tolerances, Real, SpatialInertia, SpatialTransform,
    STANDARD_GRAVITY,
};
use nalgebra::Vector3;

/// Finalized, immutable description of an articulated mechanism.
///
/// Bodies and joints live in arenas indexed by [`BodyIndex`] / [`JointIndex`];
/// the traversal order is a precomputed array with parents always preceding
/// children, so the dynamics passes are plain loops rather than recursion.
#[derive(Debug, Clone)]
pub struct Model<T: Real> {
    bodies: Vec<Body<T>>,
    joints: Vec<Joint<T>>,
    order: Vec<BodyIndex>,
    nq: usize,
    nv: usize,
    gravity: Vector3<T>,
}

impl<T: Real> Model<T> {
    /// All bodies, world included at index 0.
    pub fn bodies(&self) -> &[Body<T>] {
        &self.bodies
    }

    /// All joints.
    pub fn joints(&self) -> &[Joint<T>] {
        &self.joints
    }

    /// A body by index.
    pub fn body(&self, index: BodyIndex) -> &Body<T> {
        &self.bodies[index.0]
    }

    /// A joint by index.
    pub fn joint(&self, index: JointIndex) -> &Joint<T> {
        &self.joints[index.0]
    }

    /// Non-world bodies in topological order (parents before children).
    /// Iterate this forward for top-down passes and in reverse for tip-to-base
    /// passes.
    pub fn order(&self) -> &[BodyIndex] {
        &self.order
    }

    /// Number of bodies, world included.
    pub fn num_bodies(&self) -> usize {
        self.bodies.len()
    }

    /// Total number of generalized position coordinates.
    pub fn nq(&self) -> usize {
        self.nq
    }

    /// Total number of generalized velocity coordinates.
    pub fn nv(&self) -> usize {
        self.nv
    }

    /// Default gravity vector in the world frame.
    pub fn gravity(&self) -> Vector3<T> {
        self.gravity
    }
}

/// Builder for [`Model`]. The world body is preseeded at index 0.
pub struct ModelBuilder<T: Real> {
    bodies: Vec<Body<T>>,
    joints: Vec<Joint<T>>,
    gravity: Vector3<T>,
    finalized: bool,
}

impl<T: Real> ModelBuilder<T> {
    /// Start building a new model.
    pub fn new() -> Self {
        let world = Body {
            name: "world".to_string(),
            inertia: SpatialInertia::zero(),
            parent_joint: None,
            node: 0,
        };
        Self {
            bodies: vec![world],
            joints: Vec::new(),
            gravity: Vector3::new(
                <T as Real>::from_f64(0.0),
                <T as Real>::from_f64(0.0),
                <T as Real>::from_f64(-STANDARD_GRAVITY),
            ),
            finalized: false,
        }
    }

    /// Set the default gravity vector (world frame).
    pub fn gravity(&mut self, g: Vector3<T>) -> &mut Self {
        self.gravity = g;
        self
    }

    /// Add a body with the given spatial inertia (in its own frame).
    pub fn add_body(&mut self, name: &str, inertia: SpatialInertia<T>) -> Result<BodyIndex> {
        if self.finalized {
            return Err(ModelError::AlreadyFinalized);
        }
        let index = BodyIndex(self.bodies.len());
        self.bodies.push(Body {
            name: name.to_string(),
            inertia,
            parent_joint: None,
            node: 0,
        });
        Ok(index)
    }

    /// Add a joint connecting `parent` to `child`.
    ///
    /// `x_parent_joint` is the fixed transform from the parent body frame to
    /// the joint frame; its rotation is validated. `axis` applies to revolute
    /// (default +Z) and prismatic (default +X) joints, must be a unit vector,
    /// and is ignored for the other kinds.
    pub fn add_joint(
        &mut self,
        name: &str,
        parent: BodyIndex,
        child: BodyIndex,
        kind: JointKind,
        x_parent_joint: SpatialTransform<T>,
        axis: Option<Vector3<T>>,
    ) -> Result<JointIndex> {
        if self.finalized {
            return Err(ModelError::AlreadyFinalized);
        }
        if parent.0 >= self.bodies.len() {
            return Err(ModelError::UnknownBody(parent.0));
        }
        if child.0 >= self.bodies.len() {
            return Err(ModelError::UnknownBody(child.0));
        }
        if child == BodyIndex::WORLD {
            return Err(ModelError::WorldCannotBeChild);
        }
        if self.bodies[child.0].parent_joint.is_some() {
            return Err(ModelError::DuplicateParentJoint(child.0));
        }
        check_rotation_matrix(&x_parent_joint.rot)?;

        let axis = match kind {
            JointKind::Revolute => {
                let a = axis.unwrap_or_else(|| {
                    Vector3::new(<T as Real>::from_f64(0.0), <T as Real>::from_f64(0.0), <T as Real>::from_f64(1.0))
                });
                check_unit_vector(&a, tolerances::UNIT_VECTOR)?;
                a
            }
            JointKind::Prismatic => {
                let a = axis.unwrap_or_else(|| {
                    Vector3::new(<T as Real>::from_f64(1.0), <T as Real>::from_f64(0.0), <T as Real>::from_f64(0.0))
                });
                check_unit_vector(&a, tolerances::UNIT_VECTOR)?;
                a
            }
            JointKind::Weld | JointKind::Spherical | JointKind::Free => Vector3::zeros(),
        };

        let index = JointIndex(self.joints.len());
        self.joints.push(Joint {
            name: name.to_string(),
            kind,
            parent,
            child,
            x_parent_joint,
            axis,
            damping: <T as Real>::from_f64(0.0),
            q_offset: 0,
            v_offset: 0,
        });
        self.bodies[child.0].parent_joint = Some(index);
        Ok(index)
    }

    /// Set the viscous damping coefficient of a joint.
    pub fn set_joint_damping(&mut self, joint: JointIndex, damping: T) -> Result<()> {
        if self.finalized {
            return Err(ModelError::AlreadyFinalized);
        }
        match self.joints.get_mut(joint.0) {
            Some(j) => {
                j.damping = damping;
                Ok(())
            }
            None => Err(ModelError::UnknownJoint(joint.0)),
        }
    }

    /// Seal the model: verify the joint graph is a single tree rooted at
    /// world, assign node indices and dof offsets, and hand out the immutable
    /// [`Model`].
    pub fn finalize(&mut self) -> Result<Model<T>> {
        if self.finalized {
            return Err(ModelError::AlreadyFinalized);
        }

        // Children adjacency from the joint arena.
        let n = self.bodies.len();
        let mut children: Vec<Vec<BodyIndex>> = vec![Vec::new(); n];
        for joint in &self.joints {
            children[joint.parent.0].push(joint.child);
        }

        // Breadth-first from world. Every body must be reached; a body in a
        // cycle or floating without a parent joint never is.
        let mut order = Vec::with_capacity(n - 1);
        let mut visited = vec![false; n];
        visited[0] = true;
        let mut frontier = std::collections::VecDeque::from([BodyIndex::WORLD]);
        while let Some(b) = frontier.pop_front() {
            for &c in &children[b.0] {
                visited[c.0] = true;
                order.push(c);
                frontier.push_back(c);
            }
        }
        if let Some(missing) = visited.iter().position(|&v| !v) {
            return Err(ModelError::DisconnectedBody(missing));
        }

        for (k, &b) in order.iter().enumerate() {
            self.bodies[b.0].node = k + 1;
        }

        let mut nq = 0;
        let mut nv = 0;
        for joint in &mut self.joints {
            joint.q_offset = nq;
            joint.v_offset = nv;
            nq += joint.ndof();
            nv += joint.ndof();
        }

        self.finalized = true;
        Ok(Model {
            bodies: std::mem::take(&mut self.bodies),
            joints: std::mem::take(&mut self.joints),
            order,
            nq,
            nv,
            gravity: self.gravity,
        })
    }
}

impl<T: Real> Default for ModelBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Matrix3;

    type Vec3 = Vector3<f64>;

    fn unit_inertia() -> SpatialInertia<f64> {
        SpatialInertia::solid_cube(1.0, 1.0)
    }

    #[test]
    fn two_link_chain_finalizes() {
        let mut builder = ModelBuilder::<f64>::new();
        let a = builder.add_body("a", unit_inertia()).unwrap();
        let b = builder.add_body("b", unit_inertia()).unwrap();
        builder
            .add_joint(
                "world_a",
                BodyIndex::WORLD,
                a,
                JointKind::Revolute,
                SpatialTransform::identity(),
                None,
            )
            .unwrap();
        builder
            .add_joint(
                "a_b",
                a,
                b,
                JointKind::Prismatic,
                SpatialTransform::translation(Vec3::new(0.0, -1.0, 0.0)),
                Some(Vec3::new(0.0, 1.0, 0.0)),
            )
            .unwrap();
        let model = builder.finalize().unwrap();

        assert_eq!(model.num_bodies(), 3);
        assert_eq!(model.nq(), 2);
        assert_eq!(model.nv(), 2);
        assert_eq!(model.order(), &[a, b]);
        assert_eq!(model.body(a).node, 1);
        assert_eq!(model.body(b).node, 2);
        assert_eq!(model.joint(model.body(b).parent_joint.unwrap()).v_offset, 1);
    }

    #[test]
    fn finalize_twice_fails() {
        let mut builder = ModelBuilder::<f64>::new();
        builder.add_body("a", unit_inertia()).unwrap();
        // Body "a" has no joint: disconnected.
        assert!(matches!(
            builder.finalize(),
            Err(ModelError::DisconnectedBody(1))
        ));

        let mut builder = ModelBuilder::<f64>::new();
        let a = builder.add_body("a", unit_inertia()).unwrap();
        builder
            .add_joint(
                "j",
                BodyIndex::WORLD,
                a,
                JointKind::Weld,
                SpatialTransform::identity(),
                None,
            )
            .unwrap();
        builder.finalize().unwrap();
        assert!(matches!(builder.finalize(), Err(ModelError::AlreadyFinalized)));
        assert!(matches!(
            builder.add_body("b", unit_inertia()),
            Err(ModelError::AlreadyFinalized)
        ));
    }

    #[test]
    fn dangling_and_duplicate_references_fail() {
        let mut builder = ModelBuilder::<f64>::new();
        let a = builder.add_body("a", unit_inertia()).unwrap();
        assert!(matches!(
            builder.add_joint(
                "dangling",
                BodyIndex(7),
                a,
                JointKind::Revolute,
                SpatialTransform::identity(),
                None,
            ),
            Err(ModelError::UnknownBody(7))
        ));
        assert!(matches!(
            builder.add_joint(
                "world_child",
                a,
                BodyIndex::WORLD,
                JointKind::Revolute,
                SpatialTransform::identity(),
                None,
            ),
            Err(ModelError::WorldCannotBeChild)
        ));
        builder
            .add_joint(
                "j0",
                BodyIndex::WORLD,
                a,
                JointKind::Revolute,
                SpatialTransform::identity(),
                None,
            )
            .unwrap();
        assert!(matches!(
            builder.add_joint(
                "j1",
                BodyIndex::WORLD,
                a,
                JointKind::Revolute,
                SpatialTransform::identity(),
                None,
            ),
            Err(ModelError::DuplicateParentJoint(1))
        ));
    }

    #[test]
    fn bad_axis_and_bad_offset_rotation_fail() {
        let mut builder = ModelBuilder::<f64>::new();
        let a = builder.add_body("a", unit_inertia()).unwrap();
        assert!(matches!(
            builder.add_joint(
                "j",
                BodyIndex::WORLD,
                a,
                JointKind::Revolute,
                SpatialTransform::identity(),
                Some(Vec3::new(1.0, 2.0, 3.0)),
            ),
            Err(ModelError::InvalidArgument(_))
        ));

        let skewed = SpatialTransform::new(Matrix3::identity() * 1.5, Vec3::zeros());
        assert!(matches!(
            builder.add_joint("j", BodyIndex::WORLD, a, JointKind::Weld, skewed, None),
            Err(ModelError::InvalidArgument(_))
        ));
    }

    #[test]
    fn zero_dof_model_has_empty_coordinates() {
        let mut builder = ModelBuilder::<f64>::new();
        let a = builder.add_body("a", unit_inertia()).unwrap();
        let b = builder.add_body("b", unit_inertia()).unwrap();
        builder
            .add_joint(
                "wa",
                BodyIndex::WORLD,
                a,
                JointKind::Weld,
                SpatialTransform::identity(),
                None,
            )
            .unwrap();
        builder
            .add_joint(
                "ab",
                a,
                b,
                JointKind::Weld,
                SpatialTransform::translation(Vec3::new(1.5, 0.0, 0.0)),
                None,
            )
            .unwrap();
        let model = builder.finalize().unwrap();
        assert_eq!(model.nq(), 0);
        assert_eq!(model.nv(), 0);
    }
}
