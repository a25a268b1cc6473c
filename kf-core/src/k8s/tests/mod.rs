mod interop_test;

use assertables::*;
use rstest::*;

use super::*;
use crate::prelude::*;
use crate::testutils::*;
