
use assertables::*;
use rstest::*;

use super::*;
use crate::testutils::*;
